//! UseCase: 入力中インジケーター処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - TypingIndicatorUseCase::start() / stop() メソッド
//! - 無操作期間（既定 3 秒）経過での自動停止、開始シグナルによる期限の延長
//!
//! ### なぜこのテストが必要か
//! - 入力停止シグナルが届かなくてもインジケーターが残り続けないことを保証
//! - 延長前の古いタイマーが新しい入力状態を止めないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：開始 → 無操作で自動停止、開始 → 明示的な停止
//! - エッジケース：連続した開始シグナル、入力中でないユーザーの停止

use std::{sync::Arc, time::Duration};

use crate::domain::{ConnectionId, RelayRepository, TypingSignal, TypingStart, UserId};

/// 入力中インジケーターのユースケース
pub struct TypingIndicatorUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// 無操作でインジケーターを止めるまでの時間
    quiet_period: Duration,
}

impl TypingIndicatorUseCase {
    /// 新しい TypingIndicatorUseCase を作成
    pub fn new(repository: Arc<dyn RelayRepository>, quiet_period: Duration) -> Self {
        Self {
            repository,
            quiet_period,
        }
    }

    /// 入力開始を処理し、ユーザーごとに 1 本だけの停止タイマーを張り直す
    pub async fn start(&self, connection: &ConnectionId, signal: TypingSignal) -> TypingStart {
        let user_id = signal.user_id.clone();
        let start = self.repository.start_typing(connection, signal).await;
        let generation = start.generation();

        let repository = self.repository.clone();
        let quiet_period = self.quiet_period;
        let timer_user = user_id.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            if let Some(notified) = repository.expire_typing(&timer_user, generation).await {
                tracing::debug!(
                    "Typing indicator of '{}' timed out ({} notified)",
                    timer_user,
                    notified
                );
            }
        });

        if !self
            .repository
            .arm_typing_timer(&user_id, generation, timer.abort_handle())
            .await
        {
            tracing::debug!("Typing timer for '{}' was already superseded", user_id);
        }

        start
    }

    /// 入力停止を処理する
    ///
    /// # Returns
    ///
    /// 入力中だった場合は `true`。入力中でなければ何も送られない
    pub async fn stop(&self, user_id: &UserId) -> bool {
        match self.repository.stop_typing(user_id).await {
            Some(notified) => {
                tracing::debug!("'{}' stopped typing ({} notified)", user_id, notified);
                true
            }
            None => false,
        }
    }
}
