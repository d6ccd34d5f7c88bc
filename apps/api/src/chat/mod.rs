// Session-scoped conversation primitives shared by the generation API and the
// streaming session client: messages, history, flow lifecycle, test questions.

pub mod conversation;
pub mod flow;
pub mod message;
pub mod question;
pub mod sentinel;

pub use conversation::Conversation;
pub use flow::{FlowError, FlowMachine, FlowState};
pub use message::{Message, MessageId, Role, StoredMessage};
pub use question::{Question, QuestionError, QuestionSet, MAX_TEST_QUESTIONS};
pub use sentinel::{strip_sentinel, END_OF_INTERVIEW};
