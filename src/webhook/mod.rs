mod payload;
mod server;
mod tls;

pub use payload::{
    ApiResource, ApiResourceList, ChallengePayload, ChallengeResponse, Status, PAYLOAD_API_VERSION,
    PAYLOAD_KIND, SOLVER_VERSION,
};
pub use server::{router, run};
pub use tls::load_rustls_config;
