//! UseCase: メッセージ中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase の顧客発・担当者発・旧形式の各メッセージ中継
//!
//! ### なぜこのテストが必要か
//! - 顧客のメッセージは送信者以外の全担当者に届く
//! - 担当者のメッセージは宛先の顧客 1 人だけに届き、不在なら黙って破棄される
//! - タイムスタンプはクライアントの値ではなくサーバーの受信時刻になる
//!
//! ### どのような状況を想定しているか
//! - 正常系：顧客 → 全担当者、担当者 → 顧客
//! - 異常系：宛先の顧客が不在
//! - エッジケース：担当者が 1 人もいない、旧形式のブロードキャスト

use std::sync::Arc;

use uketsuke_shared::time::now_millis;

use crate::domain::{
    AgentMessage, ConnectionId, CustomerMessage, LegacyChannel, RelayRepository, Timestamp,
};

use super::error::SendMessageError;

/// メッセージ中継のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(repository: Arc<dyn RelayRepository>) -> Self {
        Self { repository }
    }

    /// 顧客のメッセージを全担当者に中継する
    ///
    /// # Returns
    ///
    /// メッセージが届いた担当者の数（0 でもエラーではない）
    pub async fn send_customer_message(
        &self,
        sender: &ConnectionId,
        message: CustomerMessage,
    ) -> usize {
        let customer_id = message.customer_id.clone();
        let received_at = Timestamp::new(now_millis());

        let delivered = self
            .repository
            .route_customer_message(sender, message, received_at)
            .await;

        tracing::info!(
            "Customer '{}' message relayed to {} agent(s)",
            customer_id,
            delivered
        );
        delivered
    }

    /// 担当者のメッセージを宛先の顧客に中継する
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 顧客に届いた
    /// * `Err(SendMessageError::RecipientOffline)` - 顧客が不在で破棄された
    pub async fn send_agent_message(&self, message: AgentMessage) -> Result<(), SendMessageError> {
        let customer_id = message.customer_id.clone();
        let agent_id = message.agent_id.clone();
        let received_at = Timestamp::new(now_millis());

        if !self
            .repository
            .route_agent_message(message, received_at)
            .await
        {
            return Err(SendMessageError::RecipientOffline(customer_id.into_string()));
        }

        tracing::info!("Agent '{}' message relayed to customer '{}'", agent_id, customer_id);
        Ok(())
    }

    /// 旧形式のイベントを送信者以外の全接続にそのまま転送する
    pub async fn broadcast_legacy(
        &self,
        sender: &ConnectionId,
        channel: LegacyChannel,
        payload: serde_json::Value,
    ) -> usize {
        let delivered = self.repository.route_legacy(sender, channel, payload).await;
        tracing::debug!(
            "Legacy {:?} event from '{}' forwarded to {} connection(s)",
            channel,
            sender,
            delivered
        );
        delivered
    }
}
