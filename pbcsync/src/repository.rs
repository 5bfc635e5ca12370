use std::future::Future;

use async_trait::async_trait;
use pbcloud_core::{AuthClient, CloudClient, LoginRequest, PbCloudError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::sync::{Book, BookLister, RemoteError};

/// Lists every book of an account across all of its providers.
#[derive(Clone)]
pub struct BooksRepository {
    auth: AuthClient,
    cloud: CloudClient,
    username: String,
    password: String,
}

impl BooksRepository {
    pub fn new(
        auth: AuthClient,
        cloud: CloudClient,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            cloud,
            username: username.into(),
            password: password.into(),
        }
    }

    async fn fetch_books(&self, cancel: &CancellationToken) -> Result<Vec<Book>, RemoteError> {
        let providers = call(cancel, "get providers", self.auth.providers(&self.username)).await?;

        let mut books = Vec::new();
        for provider in providers {
            let request = LoginRequest {
                shop_id: provider.shop_id.clone(),
                username: self.username.clone(),
                password: self.password.clone(),
                provider: provider.alias.clone(),
            };
            let token = call(cancel, "login", self.auth.login(&request)).await?;

            let count = call(
                cancel,
                "get books count",
                self.cloud.books(&token.access_token, 0, 0),
            )
            .await?;
            debug!(
                total = count.total,
                provider_shop_id = %provider.shop_id,
                provider_name = %provider.name,
                provider_alias = %provider.alias,
                "books"
            );
            if count.total == 0 {
                continue;
            }

            let page = call(
                cancel,
                "get books",
                self.cloud.books(&token.access_token, count.total, 0),
            )
            .await?;
            for book in page.items {
                if book.link.is_empty() {
                    warn!(book_id = %book.id, book_name = %book.name, "book link is empty");
                    continue;
                }
                books.push(Book::new(book.name, book.link));
            }
        }

        Ok(books)
    }
}

#[async_trait]
impl BookLister for BooksRepository {
    async fn books(&self, cancel: &CancellationToken) -> Result<Vec<Book>, RemoteError> {
        self.fetch_books(cancel).await
    }
}

async fn call<T>(
    cancel: &CancellationToken,
    operation: &'static str,
    request: impl Future<Output = Result<T, PbCloudError>>,
) -> Result<T, RemoteError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RemoteError::Cancelled),
        result = request => result.map_err(RemoteError::cloud(operation)),
    }
}
