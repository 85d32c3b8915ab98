//! REST storage backend over the portal API.
//!
//! Thin transport: validation happens in the facades before anything is
//! sent, and the server re-validates on its side. Session state is not
//! managed here — the surrounding application owns the bearer token.

mod map;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use tribuna_api_types::{CategoryDto, DataEnvelope, ListEnvelope, PostDto, UserDto};

use crate::application::repos::{
    CategoriesStore, PostsStore, RepoError, UsersStore,
};
use crate::config::ApiSettings;
use crate::domain::entities::{CategoryRecord, PostRecord, UserRecord};
use crate::infra::error::InfraError;

const PAGE_SIZE: u32 = 100;

pub struct ApiClient {
    client: Client,
    base: Url,
    bearer_token: Option<String>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, InfraError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| InfraError::configuration(format!("invalid API base URL: {err}")))?;
        // Relative joins drop the last path segment unless the base ends
        // with a slash, which would silently lose an `/api` prefix.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| InfraError::transport(err.to_string()))?;
        Ok(Self {
            client,
            base,
            bearer_token: settings.bearer_token.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("tribuna/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, path: &str) -> Result<Url, RepoError> {
        self.base.join(path).map_err(RepoError::transport)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T, RepoError> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(RepoError::transport)?;
        if !status.is_success() {
            return Err(Self::status_error(status, &bytes));
        }
        serde_json::from_slice(&bytes)
            .map_err(|err| RepoError::from_persistence(format!("failed to parse body: {err}")))
    }

    fn status_error(status: StatusCode, body: &[u8]) -> RepoError {
        match status {
            StatusCode::NOT_FOUND => RepoError::NotFound,
            StatusCode::CONFLICT => RepoError::Duplicate {
                constraint: String::from_utf8_lossy(body).trim().to_string(),
            },
            _ => RepoError::Persistence(format!(
                "status {status} body {}",
                String::from_utf8_lossy(body)
            )),
        }
    }

    /// Drain every page of a listing endpoint into one snapshot.
    async fn fetch_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, RepoError> {
        let mut page = 1u32;
        let mut items: Vec<T> = Vec::new();
        loop {
            let url = self.url(path)?;
            let response = self
                .request(Method::GET, url)
                .query(&[("page", page.to_string()), ("page_size", PAGE_SIZE.to_string())])
                .send()
                .await
                .map_err(RepoError::transport)?;
            let envelope: ListEnvelope<T> = Self::handle(response).await?;
            let fetched = envelope.data.len();
            items.extend(envelope.data);
            if fetched == 0 || items.len() as u64 >= envelope.total {
                return Ok(items);
            }
            page += 1;
        }
    }

    async fn fetch_one<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, RepoError> {
        let url = self.url(path)?;
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(RepoError::transport)?;
        match Self::handle::<DataEnvelope<T>>(response).await {
            Ok(envelope) => Ok(Some(envelope.data)),
            Err(RepoError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, RepoError> {
        let url = self.url(path)?;
        let response = self
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(RepoError::transport)?;
        let envelope: DataEnvelope<T> = Self::handle(response).await?;
        Ok(envelope.data)
    }

    async fn send_unit(&self, method: Method, path: &str) -> Result<(), RepoError> {
        let url = self.url(path)?;
        let response = self
            .request(method, url)
            .send()
            .await
            .map_err(RepoError::transport)?;
        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            return Err(Self::status_error(status, &bytes));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoriesStore for ApiClient {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let dtos: Vec<CategoryDto> = self.fetch_all("categories").await?;
        Ok(dtos.into_iter().map(map::category_from_dto).collect())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        let dto: Option<CategoryDto> = self.fetch_one(&format!("categories/{id}")).await?;
        Ok(dto.map(map::category_from_dto))
    }

    async fn insert_category(&self, record: CategoryRecord) -> Result<CategoryRecord, RepoError> {
        let dto: CategoryDto = self
            .send(Method::POST, "categories", &map::category_to_payload(&record))
            .await?;
        Ok(map::category_from_dto(dto))
    }

    async fn update_category(&self, record: CategoryRecord) -> Result<CategoryRecord, RepoError> {
        let dto: CategoryDto = self
            .send(
                Method::PUT,
                &format!("categories/{}", record.id),
                &map::category_to_payload(&record),
            )
            .await?;
        Ok(map::category_from_dto(dto))
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), RepoError> {
        self.send_unit(Method::DELETE, &format!("categories/{id}"))
            .await
    }
}

#[async_trait]
impl PostsStore for ApiClient {
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        let dtos: Vec<PostDto> = self.fetch_all("posts").await?;
        Ok(dtos.into_iter().map(map::post_from_dto).collect())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let dto: Option<PostDto> = self.fetch_one(&format!("posts/{id}")).await?;
        Ok(dto.map(map::post_from_dto))
    }

    async fn insert_post(&self, record: PostRecord) -> Result<PostRecord, RepoError> {
        let dto: PostDto = self
            .send(Method::POST, "posts", &map::post_to_payload(&record))
            .await?;
        Ok(map::post_from_dto(dto))
    }

    async fn update_post(&self, record: PostRecord) -> Result<PostRecord, RepoError> {
        let dto: PostDto = self
            .send(
                Method::PUT,
                &format!("posts/{}", record.id),
                &map::post_to_payload(&record),
            )
            .await?;
        Ok(map::post_from_dto(dto))
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        self.send_unit(Method::DELETE, &format!("posts/{id}")).await
    }
}

#[async_trait]
impl UsersStore for ApiClient {
    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        let dtos: Vec<UserDto> = self.fetch_all("users").await?;
        Ok(dtos.into_iter().map(map::user_from_dto).collect())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let dto: Option<UserDto> = self.fetch_one(&format!("users/{id}")).await?;
        Ok(dto.map(map::user_from_dto))
    }

    async fn insert_user(&self, record: UserRecord) -> Result<UserRecord, RepoError> {
        let dto: UserDto = self
            .send(Method::POST, "users", &map::user_to_payload(&record))
            .await?;
        Ok(map::user_from_dto(dto))
    }

    async fn update_user(&self, record: UserRecord) -> Result<UserRecord, RepoError> {
        let dto: UserDto = self
            .send(
                Method::PUT,
                &format!("users/{}", record.id),
                &map::user_to_payload(&record),
            )
            .await?;
        Ok(map::user_from_dto(dto))
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), RepoError> {
        self.send_unit(Method::DELETE, &format!("users/{id}")).await
    }
}
