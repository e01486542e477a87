//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 切断時の後始末（在席情報からの削除、入力中タイマーの取り消し）
//!
//! ### なぜこのテストが必要か
//! - 切断したユーザーにメッセージが届き続けないことを保証
//! - 入力中のまま切断しても入力停止通知が送られないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録済み参加者の切断
//! - エッジケース：入力中の切断、未登録のまま切断

use std::sync::Arc;

use crate::domain::{ConnectionId, DisconnectOutcome, RelayRepository};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(repository: Arc<dyn RelayRepository>) -> Self {
        Self { repository }
    }

    /// 参加者切断を実行
    ///
    /// この接続が所有していた登録だけが削除されます。入力中タイマーは
    /// 通知なしで取り消されます。
    pub async fn execute(&self, connection: &ConnectionId) -> DisconnectOutcome {
        let outcome = self.repository.close_connection(connection).await;

        match &outcome.identity {
            Some(identity) => tracing::info!(
                "{} '{}' disconnected (connection '{}', typing cancelled: {})",
                identity.role,
                identity.id,
                connection,
                outcome.typing_cancelled
            ),
            None => tracing::info!("Unregistered connection '{}' closed", connection),
        }

        outcome
    }
}
