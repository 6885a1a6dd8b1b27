//! Ping API service.

use crate::client::MaileonClient;
use crate::errors::MaileonResult;
use crate::response::ResponseWrapper;

const PATH: &str = "ping";

/// Service for checking connectivity and credentials.
///
/// Each check exercises one HTTP method against the `ping` resource.
pub struct PingService<'a> {
    client: &'a MaileonClient,
}

impl<'a> PingService<'a> {
    /// Creates a new ping service.
    pub fn new(client: &'a MaileonClient) -> Self {
        Self { client }
    }

    /// GET `ping`.
    pub fn check_retrieve(&self) -> MaileonResult<ResponseWrapper> {
        self.client.get(PATH)
    }

    /// DELETE `ping`.
    pub fn check_delete(&self) -> MaileonResult<ResponseWrapper> {
        self.client.delete(PATH)
    }

    /// PUT `ping` with an empty entity.
    pub fn check_create(&self) -> MaileonResult<ResponseWrapper> {
        self.client.put(PATH, None)
    }

    /// POST `ping` with an empty entity.
    pub fn check_update(&self) -> MaileonResult<ResponseWrapper> {
        self.client.post(PATH, None)
    }
}
