pub mod attachment;
pub mod avatar;
pub mod clock;
pub mod composer;
pub mod error;
pub mod ids;
pub mod model;
pub mod reply;
pub mod seed;
pub mod store;
pub mod view_model;

pub use attachment::{Attachment, AttachmentHost, LocalFileHost};
pub use avatar::{AvatarGroupLayout, DEFAULT_AVATAR_GROUP_LIMIT};
pub use clock::{Clock, LocalClock};
pub use composer::{Composer, EMOJI_PALETTE};
pub use error::{ChatError, ChatResult};
pub use ids::{ConversationId, MessageId, ParticipantId, ReplySessionId};
pub use model::{
    Conversation, DeliveryStatus, Message, MessageKind, OutgoingMessage, Participant, Sender,
};
pub use reply::{ReplyPhase, ReplyRejection, ReplyTicket, ReplyTiming};
pub use seed::{Seed, SeedThread};
pub use store::{ChatStore, Selection, SendReceipt};
