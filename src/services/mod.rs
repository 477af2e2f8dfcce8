pub mod boundary;
pub mod codec;
pub mod gateway;
pub mod list_query;
pub mod mutations;
pub mod patients;
pub mod session;
pub mod transport;

pub use boundary::{BoundaryState, ErrorBoundary};
pub use codec::{to_api_data, to_form_data};
pub use gateway::{
    ApiRequest, ApiResponse, CredentialProvider, DefaultErrorClassifier, ErrorClassifier,
    NoCredentials, RequestExecutor, RequestGateway, TransportError,
};
pub use list_query::{ListQueryController, ListUpdate, ListView, QueryKey};
pub use mutations::{
    DeleteOutcome, MutationOrchestrator, Navigation, Notification, NotificationLevel, SubmitOutcome,
};
pub use patients::PatientService;
pub use session::SessionStore;
pub use transport::HttpExecutor;
