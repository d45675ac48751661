pub mod ingress;
pub mod persistence_service;
pub mod presence_service;

pub use ingress::EventIngress;
pub use persistence_service::PersistenceService;
pub use presence_service::PresenceService;
