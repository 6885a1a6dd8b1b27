//! Status code mapping from buffered responses to typed errors.

use super::{MaileonError, MaileonResult};
use crate::media::{self, MAILEON_XML};
use crate::response::ResponseWrapper;
use crate::xml;

/// Rendered in place of the message for HTTP 500 when the body carries none.
pub const NO_MESSAGE: &str = "(no message)";

/// Classifies a completed exchange.
///
/// 2xx responses are handed back unchanged; everything else becomes the
/// matching [`MaileonError`] variant carrying the response.
pub fn classify(response: ResponseWrapper) -> MaileonResult<ResponseWrapper> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();

    if status.is_client_error() {
        let message = parse_error_message(&response);
        let response = Some(Box::new(response));

        return Err(match code {
            400 => MaileonError::BadRequest { message, response },
            401 => MaileonError::Authorization { message, response },
            403 => MaileonError::AccessControl { message, response },
            404 => MaileonError::NotFound { message, response },
            // Any recovered message is treated as a bad request, otherwise the
            // status stays unclassified.
            _ => match message {
                Some(message) => MaileonError::BadRequest {
                    message: Some(message),
                    response,
                },
                None => MaileonError::Generic {
                    message: None,
                    response,
                },
            },
        });
    }

    if status.is_server_error() {
        return Err(match code {
            500 => {
                let message = parse_error_message(&response);
                MaileonError::Generic {
                    message: Some(format!(
                        "500 - {}",
                        message.as_deref().unwrap_or(NO_MESSAGE)
                    )),
                    response: Some(Box::new(response)),
                }
            }
            // Maileon answers throttled requests with 503.
            503 => MaileonError::BadRequest {
                message: parse_error_message(&response),
                response: Some(Box::new(response)),
            },
            _ => MaileonError::Server {
                message: None,
                response: Some(Box::new(response)),
            },
        });
    }

    Err(MaileonError::Generic {
        message: None,
        response: Some(Box::new(response)),
    })
}

/// Extracts the text of the `message` element directly below the root of a
/// Maileon XML error body.
///
/// Returns `None` when the content type is not compatible with the Maileon XML
/// type, the body is empty, the document cannot be parsed, or the element is
/// missing. An empty element yields `Some("")`. The text is returned verbatim.
/// Never fails.
pub fn parse_error_message(response: &ResponseWrapper) -> Option<String> {
    let content_type = response.content_type()?;
    if !media::is_compatible(content_type, &MAILEON_XML) {
        return None;
    }

    let body = response.body_as_string()?;
    if body.is_empty() {
        return None;
    }

    match xml::parse_document(&body) {
        Ok(root) => root
            .child("message")
            .map(|message| message.text().unwrap_or_default().to_string()),
        Err(err) => {
            tracing::debug!(target: "maileon", error = %err, "ignoring unparseable error body");
            None
        }
    }
}
