//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod check_availability;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod register_participant;
pub mod send_message;
pub mod typing_indicator;

pub use check_availability::CheckAvailabilityUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{RegisterError, SendMessageError};
pub use register_participant::RegisterParticipantUseCase;
pub use send_message::SendMessageUseCase;
pub use typing_indicator::TypingIndicatorUseCase;
