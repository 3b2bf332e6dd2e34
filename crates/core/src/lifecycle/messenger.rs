use std::collections::VecDeque;

use portal_handoff_protocol::PortalMessage;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::error::MessageError;
use crate::model::{DocumentId, PortalHandle};

/// A message as it arrives at a document, after shape checking.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Message(PortalMessage),
    /// Anything that is neither a `control` nor an `isFollowed` object.
    Unknown(Value),
}

impl Inbound {
    pub fn decode(data: Value) -> Self {
        match serde_json::from_value::<PortalMessage>(data.clone()) {
            Ok(message) => Inbound::Message(message),
            Err(_) => Inbound::Unknown(data),
        }
    }
}

#[derive(Debug, Clone)]
struct Envelope {
    to: DocumentId,
    sender_origin: String,
    target_origin: Option<String>,
    data: Value,
}

/// One delivered message, addressed to `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: DocumentId,
    pub message: Inbound,
}

/// The `postMessage` channel between a document and the document on the
/// other side of a portal.
///
/// Messages travel as plain JSON, in arrival order, with no acknowledgement
/// or retry. Only same-origin pairs can talk; anything else is dropped at
/// delivery with a warning.
#[derive(Debug, Default)]
pub struct Messenger {
    queue: VecDeque<Envelope>,
    dropped: usize,
}

impl Messenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post through `portal` to the document it shows.
    pub fn post(
        &mut self,
        sender: &Url,
        portal: &PortalHandle,
        message: &PortalMessage,
        target_origin: Option<&Url>,
    ) -> Result<(), MessageError> {
        let data = serde_json::to_value(message)?;
        self.post_raw(sender, portal.target(), data, target_origin);
        Ok(())
    }

    /// Post arbitrary JSON. Used for messages built outside the typed API.
    pub fn post_raw(
        &mut self,
        sender: &Url,
        to: DocumentId,
        data: Value,
        target_origin: Option<&Url>,
    ) {
        self.queue.push_back(Envelope {
            to,
            sender_origin: sender.origin().ascii_serialization(),
            target_origin: target_origin.map(|u| u.origin().ascii_serialization()),
            data,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Messages dropped so far for failing the origin check.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Pop the next message that passes the origin check.
    ///
    /// `origin_of` maps a receiving document to its URL.
    pub fn next_delivery(
        &mut self,
        mut origin_of: impl FnMut(DocumentId) -> Option<Url>,
    ) -> Option<Delivery> {
        while let Some(envelope) = self.queue.pop_front() {
            let Some(receiver) = origin_of(envelope.to) else {
                warn!(to = %envelope.to, "message for unknown document dropped");
                self.dropped += 1;
                continue;
            };
            let receiver_origin = receiver.origin().ascii_serialization();
            if envelope.sender_origin != receiver_origin {
                warn!(
                    sender = %envelope.sender_origin,
                    receiver = %receiver_origin,
                    "cross-origin message dropped"
                );
                self.dropped += 1;
                continue;
            }
            if envelope
                .target_origin
                .as_ref()
                .is_some_and(|target| *target != receiver_origin)
            {
                warn!(
                    receiver = %receiver_origin,
                    target = ?envelope.target_origin,
                    "message target origin mismatch, dropped"
                );
                self.dropped += 1;
                continue;
            }
            return Some(Delivery {
                to: envelope.to,
                message: Inbound::decode(envelope.data),
            });
        }
        None
    }
}
