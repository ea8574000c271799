mod api_server;

pub use api_server::{router, ApiServer, ApiState, BatchRequest, ErrorResponse, HealthResponse, SERVICE_NAME};
