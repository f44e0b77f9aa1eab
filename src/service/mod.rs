pub mod discovery;
pub mod dispatcher;
pub mod mailer;
pub mod packet;

pub use discovery::discover_pairs;
pub use dispatcher::{DeliveryMode, DispatchError, Dispatcher};
pub use mailer::{DeliveryError, Mailer, OutgoingMail, SmtpMailer};
pub use packet::{assemble_packet, merge_documents, AssembledPacket, PacketError};
