//! UseCase: 担当者の対応可否確認

use std::sync::Arc;

use crate::domain::{ConnectionId, RelayError, RelayRepository};

/// 担当者の対応可否確認のユースケース
pub struct CheckAvailabilityUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
}

impl CheckAvailabilityUseCase {
    /// 新しい CheckAvailabilityUseCase を作成
    pub fn new(repository: Arc<dyn RelayRepository>) -> Self {
        Self { repository }
    }

    /// 問い合わせてきた接続にだけ対応可否を返信する
    pub async fn reply(&self, connection: &ConnectionId) -> Result<bool, RelayError> {
        let available = self.repository.reply_availability(connection).await?;
        tracing::debug!("Availability ({}) sent to '{}'", available, connection);
        Ok(available)
    }

    /// 対応可能（online）な担当者数（HTTP API 用）
    pub async fn online_agent_count(&self) -> usize {
        self.repository.online_agent_count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ConnectionIdFactory, DisplayName, Identity, MockRelayRepository, Role, Timestamp,
            UserId,
        },
        infrastructure::repository::InMemoryRelayRepository,
    };
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_reply_goes_only_to_requester() {
        // テスト項目: 対応可否は問い合わせた接続だけに返る
        // given (前提条件):
        let repository = Arc::new(InMemoryRelayRepository::new());
        let usecase = CheckAvailabilityUseCase::new(repository.clone());
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let requester = ConnectionIdFactory::generate();
        let agent = ConnectionIdFactory::generate();
        repository
            .open_connection(requester.clone(), tx1, Timestamp::new(0))
            .await;
        repository
            .open_connection(agent.clone(), tx2, Timestamp::new(0))
            .await;
        repository
            .register(
                &agent,
                Identity::new(
                    UserId::new("agent-1".to_string()).unwrap(),
                    DisplayName::new("Dave".to_string()),
                    Role::Agent,
                ),
            )
            .await
            .unwrap();

        // when (操作):
        let available = usecase.reply(&requester).await.unwrap();

        // then (期待する結果):
        assert!(available);
        let frame: serde_json::Value = serde_json::from_str(&rx1.try_recv().unwrap()).unwrap();
        assert_eq!(frame["data"]["available"], true);
        assert!(rx2.try_recv().is_err());
        assert_eq!(usecase.online_agent_count().await, 1);
    }

    #[tokio::test]
    async fn test_online_agent_count_reads_repository() {
        // テスト項目: 担当者数は Repository の値をそのまま返す
        // given (前提条件):
        let mut repository = MockRelayRepository::new();
        repository.expect_online_agent_count().times(1).returning(|| 3);
        let usecase = CheckAvailabilityUseCase::new(Arc::new(repository));

        // when (操作):
        let count = usecase.online_agent_count().await;

        // then (期待する結果):
        assert_eq!(count, 3);
    }
}
