//! UseCase: 参加者登録処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RegisterParticipantUseCase::execute() メソッド
//! - `user_connected` による身元の登録（在席情報の更新、顧客への対応可否の即時返信）
//!
//! ### なぜこのテストが必要か
//! - 顧客は登録直後に担当者の在席状況を知る必要がある
//! - 同じユーザー ID の再登録（再接続）で古い接続が置き換えられることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：顧客・担当者の登録
//! - エッジケース：同じユーザー ID での再登録
//! - 異常系：既に閉じた接続での登録

use std::sync::Arc;

use crate::domain::{ConnectionId, Identity, Registered, RelayRepository};

use super::error::RegisterError;

/// 参加者登録のユースケース
pub struct RegisterParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
}

impl RegisterParticipantUseCase {
    /// 新しい RegisterParticipantUseCase を作成
    pub fn new(repository: Arc<dyn RelayRepository>) -> Self {
        Self { repository }
    }

    /// 参加者登録を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - 登録を送ってきた接続
    /// * `identity` - 申告されたユーザー ID・表示名・役割（Domain Model）
    ///
    /// # Returns
    ///
    /// * `Ok(Registered)` - 登録成功（置き換えられた古い接続があれば含む）
    /// * `Err(RegisterError)` - 接続が既に閉じている
    pub async fn execute(
        &self,
        connection: &ConnectionId,
        identity: Identity,
    ) -> Result<Registered, RegisterError> {
        let user_id = identity.id.clone();
        let role = identity.role;
        let status = identity.status;

        let registered = self.repository.register(connection, identity).await?;

        if let Some(displaced) = &registered.displaced {
            tracing::warn!(
                "User '{}' re-registered; connection '{}' replaces '{}'",
                user_id,
                connection,
                displaced.connection
            );
        }
        tracing::info!(
            "Registered {} '{}' ({}) on connection '{}'",
            role,
            user_id,
            status.as_str(),
            connection
        );

        Ok(registered)
    }
}
