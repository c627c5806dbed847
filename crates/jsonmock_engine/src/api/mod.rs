/* 📖 # Why an api module?

The api module is the only place that knows about HTTP. It turns requests
into processor calls and processor results into JSON envelopes, and plugs
into the PAL as an HttpService, so it runs unchanged on RealPal and MockPal.
*/

mod service;

pub use service::MockApiService;
