use std::num::ParseIntError;
use std::path::PathBuf;

use snafu::Snafu;

use crate::ids::{ConversationId, MessageId};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ChatError {
    #[snafu(display("conversation '{id}' is not in the collection"))]
    UnknownConversation {
        stage: &'static str,
        id: ConversationId,
    },
    #[snafu(display("conversation id '{id}' appears more than once"))]
    DuplicateConversation {
        stage: &'static str,
        id: ConversationId,
    },
    #[snafu(display("message id '{id}' appears more than once"))]
    DuplicateMessage { stage: &'static str, id: MessageId },
    #[snafu(display("chat id '{raw}' is invalid for {id_type}"))]
    InvalidId {
        stage: &'static str,
        id_type: &'static str,
        raw: String,
        source: ParseIntError,
    },
    #[snafu(display("failed to read seed fixture from {path:?}"))]
    ReadSeed {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to parse seed fixture at {path:?}: {source}"))]
    ParseSeed {
        stage: &'static str,
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("attachment at {path:?} is unavailable"))]
    AttachmentUnavailable {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("attachment at {path:?} is not a regular file"))]
    AttachmentNotAFile { stage: &'static str, path: PathBuf },
}

pub type ChatResult<T> = Result<T, ChatError>;
