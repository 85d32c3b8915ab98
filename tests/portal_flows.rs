//! Facade flows over the in-memory backend: catalog and post management,
//! account invariants, and authentication.

use std::sync::Arc;

use time::OffsetDateTime;
use time::macros::datetime;
use uuid::Uuid;

use tribuna::application::accounts::{UserDraft, UserService};
use tribuna::application::auth::{AuthService, verify_password};
use tribuna::application::catalog::{CategoryDraft, CategoryService};
use tribuna::application::error::AppError;
use tribuna::application::pagination::{PageRequest, PostOrder};
use tribuna::application::posts::{PostQueryFilter, PostService, SavePostCommand};
use tribuna::application::repos::{SessionsStore, UsersStore};
use tribuna::domain::entities::{CategoryRecord, UserRecord};
use tribuna::domain::permissions::TJD_CATEGORY_SLUG;
use tribuna::domain::types::{PostStatus, Role};
use tribuna::infra::memory::MemoryStore;

const SEEDED_AT: OffsetDateTime = datetime!(2024-01-01 00:00:00 UTC);

struct Portal {
    store: Arc<MemoryStore>,
    categories: CategoryService,
    posts: PostService,
    users: UserService,
    auth: AuthService,
}

fn portal() -> Portal {
    let store = Arc::new(MemoryStore::with_defaults(SEEDED_AT));
    Portal {
        categories: CategoryService::new(store.clone(), store.clone()),
        posts: PostService::new(store.clone(), store.clone()),
        users: UserService::new(store.clone()),
        auth: AuthService::new(store.clone(), store.clone(), time::Duration::hours(12)),
        store,
    }
}

async fn actor(portal: &Portal, role: Role) -> UserRecord {
    portal
        .store
        .list_users()
        .await
        .expect("list users")
        .into_iter()
        .find(|user| user.role == role)
        .expect("seeded role")
}

async fn category(portal: &Portal, slug: &str) -> CategoryRecord {
    portal
        .categories
        .find_by_slug(slug)
        .await
        .expect("find category")
        .expect("seeded category")
}

fn post_command(category_id: Uuid, author: &UserRecord, title: &str) -> SavePostCommand {
    SavePostCommand {
        id: None,
        slug: None,
        title: title.to_string(),
        excerpt: None,
        cover_url: None,
        content_markdown: "Corpo do comunicado.".to_string(),
        status: PostStatus::Draft,
        category_id,
        author_id: author.id,
        author_name: author.name.clone(),
        featured: false,
        published_at: None,
    }
}

#[tokio::test]
async fn category_slugs_are_derived_and_suffixed_on_collision() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;

    let first = portal
        .categories
        .create_category(
            &admin,
            CategoryDraft {
                name: "Notícias".to_string(),
                ..CategoryDraft::default()
            },
        )
        .await
        .expect("create");
    assert_eq!(first.slug, "noticias");

    let second = portal
        .categories
        .create_category(
            &admin,
            CategoryDraft {
                name: "Notícias".to_string(),
                ..CategoryDraft::default()
            },
        )
        .await
        .expect("create duplicate name");
    assert_eq!(second.slug, "noticias-1");
}

#[tokio::test]
async fn updating_a_missing_category_is_not_found() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;
    let result = portal
        .categories
        .update_category(
            &admin,
            Uuid::new_v4(),
            CategoryDraft {
                name: "Qualquer".to_string(),
                ..CategoryDraft::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn toggling_a_category_flips_visibility_of_its_posts() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;
    let geral = category(&portal, "geral").await;

    let mut command = post_command(geral.id, &admin, "Aviso de rodada");
    command.status = PostStatus::Published;
    portal.posts.save_post(&admin, command).await.expect("save");

    let now = OffsetDateTime::now_utc();
    let feed = portal
        .posts
        .visible_posts(None, None, PageRequest::default(), now)
        .await
        .expect("feed");
    assert_eq!(feed.total, 1);

    portal
        .categories
        .toggle_category(&admin, geral.id)
        .await
        .expect("toggle off");
    let feed = portal
        .posts
        .visible_posts(None, None, PageRequest::default(), now)
        .await
        .expect("feed");
    assert_eq!(feed.total, 0);
}

#[tokio::test]
async fn deleting_a_category_orphans_posts_instead_of_cascading() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;
    let geral = category(&portal, "geral").await;

    let mut command = post_command(geral.id, &admin, "Comunicado antigo");
    command.status = PostStatus::Published;
    let saved = portal.posts.save_post(&admin, command).await.expect("save");

    portal
        .categories
        .delete_category(&admin, geral.id)
        .await
        .expect("delete category");

    // The post survives, but the public feed no longer shows it.
    let kept = portal.posts.find_post(saved.id).await.expect("post kept");
    assert_eq!(kept.category_id, geral.id);

    let feed = portal
        .posts
        .visible_posts(None, None, PageRequest::default(), OffsetDateTime::now_utc())
        .await
        .expect("feed");
    assert_eq!(feed.total, 0);
}

#[tokio::test]
async fn editors_publish_only_inside_their_grants() {
    let portal = portal();
    let editor = actor(&portal, Role::Editor).await;
    let atas = category(&portal, "atas").await;
    let tjd_channel = category(&portal, TJD_CATEGORY_SLUG).await;

    portal
        .posts
        .save_post(&editor, post_command(atas.id, &editor, "Ata da assembleia"))
        .await
        .expect("allowed category");

    let denied = portal
        .posts
        .save_post(
            &editor,
            post_command(tjd_channel.id, &editor, "Tentativa fora do escopo"),
        )
        .await;
    assert!(matches!(denied, Err(AppError::Permission(_))));
}

#[tokio::test]
async fn tjd_is_pinned_to_its_channel() {
    let portal = portal();
    let tjd = actor(&portal, Role::Tjd).await;
    let channel = category(&portal, TJD_CATEGORY_SLUG).await;
    let geral = category(&portal, "geral").await;

    portal
        .posts
        .save_post(&tjd, post_command(channel.id, &tjd, "Decisão do tribunal"))
        .await
        .expect("own channel");

    let denied = portal
        .posts
        .save_post(&tjd, post_command(geral.id, &tjd, "Fora do canal"))
        .await;
    assert!(matches!(denied, Err(AppError::Permission(_))));
}

#[tokio::test]
async fn admin_listing_is_scoped_by_role() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;
    let tjd = actor(&portal, Role::Tjd).await;
    let editor = actor(&portal, Role::Editor).await;
    let geral = category(&portal, "geral").await;
    let channel = category(&portal, TJD_CATEGORY_SLUG).await;

    portal
        .posts
        .save_post(&admin, post_command(geral.id, &admin, "Nota geral"))
        .await
        .expect("save");
    portal
        .posts
        .save_post(&admin, post_command(channel.id, &admin, "Nota do TJD"))
        .await
        .expect("save");

    let all = portal
        .posts
        .list_posts(
            &admin,
            &PostQueryFilter::default(),
            PostOrder::default(),
            PageRequest::default(),
        )
        .await
        .expect("admin list");
    assert_eq!(all.total, 2);

    let scoped = portal
        .posts
        .list_posts(
            &tjd,
            &PostQueryFilter::default(),
            PostOrder::default(),
            PageRequest::default(),
        )
        .await
        .expect("tjd list");
    assert_eq!(scoped.total, 1);
    assert_eq!(scoped.items[0].title, "Nota do TJD");

    let editor_view = portal
        .posts
        .list_posts(
            &editor,
            &PostQueryFilter::default(),
            PostOrder::default(),
            PageRequest::default(),
        )
        .await
        .expect("editor list");
    assert_eq!(editor_view.total, 1);
    assert_eq!(editor_view.items[0].title, "Nota geral");
}

#[tokio::test]
async fn post_slug_prefers_the_explicit_field_and_stays_unique() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;
    let geral = category(&portal, "geral").await;

    let first = portal
        .posts
        .save_post(&admin, post_command(geral.id, &admin, "Edição especial"))
        .await
        .expect("save");
    assert_eq!(first.slug, "edicao-especial");

    let mut explicit = post_command(geral.id, &admin, "Outro título");
    explicit.slug = Some("Edição Especial".to_string());
    let second = portal.posts.save_post(&admin, explicit).await.expect("save");
    assert_eq!(second.slug, "edicao-especial-1");
}

#[tokio::test]
async fn updating_a_post_keeps_its_identity_and_rechecks_slugs_excluding_itself() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;
    let geral = category(&portal, "geral").await;

    let saved = portal
        .posts
        .save_post(&admin, post_command(geral.id, &admin, "Boletim semanal"))
        .await
        .expect("create");

    let mut update = post_command(geral.id, &admin, "Boletim semanal");
    update.id = Some(saved.id);
    update.excerpt = Some("Resumo atualizado".to_string());
    let updated = portal.posts.save_post(&admin, update).await.expect("update");

    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.slug, "boletim-semanal");
    assert_eq!(updated.excerpt.as_deref(), Some("Resumo atualizado"));
    assert_eq!(updated.created_at, saved.created_at);
}

#[tokio::test]
async fn scheduled_posts_surface_once_their_time_elapses() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;
    let geral = category(&portal, "geral").await;

    let mut command = post_command(geral.id, &admin, "Convocação futura");
    command.status = PostStatus::Scheduled;
    command.published_at = Some(datetime!(2030-01-01 00:00:00 UTC));
    portal.posts.save_post(&admin, command).await.expect("save");

    let before = portal
        .posts
        .visible_posts(
            None,
            None,
            PageRequest::default(),
            datetime!(2024-01-01 00:00:00 UTC),
        )
        .await
        .expect("feed");
    assert_eq!(before.total, 0);

    let after = portal
        .posts
        .visible_posts(
            None,
            None,
            PageRequest::default(),
            datetime!(2031-01-01 00:00:00 UTC),
        )
        .await
        .expect("feed");
    assert_eq!(after.total, 1);
}

#[tokio::test]
async fn publishing_defaults_the_timestamp_and_draft_clears_it() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;
    let geral = category(&portal, "geral").await;

    let saved = portal
        .posts
        .save_post(&admin, post_command(geral.id, &admin, "Nota sem data"))
        .await
        .expect("create draft");
    assert_eq!(saved.status, PostStatus::Draft);
    assert_eq!(saved.published_at, None);

    let published = portal
        .posts
        .publish_post(&admin, saved.id)
        .await
        .expect("publish");
    assert_eq!(published.status, PostStatus::Published);
    let stamped = published.published_at.expect("publish date");
    assert!(stamped <= OffsetDateTime::now_utc());

    let reverted = portal
        .posts
        .update_post_status(&admin, saved.id, PostStatus::Draft, None)
        .await
        .expect("revert");
    assert_eq!(reverted.status, PostStatus::Draft);
    assert_eq!(reverted.published_at, None);
}

#[tokio::test]
async fn scheduling_in_the_past_means_immediately_visible() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;
    let geral = category(&portal, "geral").await;

    let saved = portal
        .posts
        .save_post(&admin, post_command(geral.id, &admin, "Retroativo"))
        .await
        .expect("create");
    portal
        .posts
        .schedule_post(&admin, saved.id, datetime!(2020-06-01 00:00:00 UTC))
        .await
        .expect("schedule in the past");

    let feed = portal
        .posts
        .visible_posts(None, None, PageRequest::default(), OffsetDateTime::now_utc())
        .await
        .expect("feed");
    assert_eq!(feed.total, 1);
}

#[tokio::test]
async fn editor_accounts_require_at_least_one_category() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;

    let result = portal
        .users
        .create_user(
            &admin,
            UserDraft {
                name: "Novo Editor".to_string(),
                email: "novo.editor@liga.local".to_string(),
                password: Some("segredo123".to_string()),
                role: Role::Editor,
                is_active: None,
                allowed_category_slugs: Some(Vec::new()),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn blank_password_on_update_keeps_the_stored_digest() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;

    let created = portal
        .users
        .create_user(
            &admin,
            UserDraft {
                name: "Clara Cronista".to_string(),
                email: "clara@liga.local".to_string(),
                password: Some("segredo123".to_string()),
                role: Role::Editor,
                is_active: None,
                allowed_category_slugs: Some(vec!["geral".to_string()]),
            },
        )
        .await
        .expect("create");

    portal
        .users
        .update_user(
            &admin,
            created.id,
            UserDraft {
                name: "Clara Cronista".to_string(),
                email: "clara@liga.local".to_string(),
                password: Some(String::new()),
                role: Role::Editor,
                is_active: None,
                allowed_category_slugs: None,
            },
        )
        .await
        .expect("update");

    let stored = portal
        .store
        .find_user(created.id)
        .await
        .expect("find")
        .expect("exists");
    assert!(verify_password("segredo123", &stored.password_digest));
}

#[tokio::test]
async fn emails_are_unique_case_insensitively() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;

    let result = portal
        .users
        .create_user(
            &admin,
            UserDraft {
                name: "Impostor".to_string(),
                email: "Admin@Liga.Local".to_string(),
                password: Some("segredo123".to_string()),
                role: Role::Reader,
                is_active: None,
                allowed_category_slugs: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn role_change_resanitizes_stored_grants() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;

    let created = portal
        .users
        .create_user(
            &admin,
            UserDraft {
                name: "Rui Revisor".to_string(),
                email: "rui@liga.local".to_string(),
                password: Some("segredo123".to_string()),
                role: Role::Editor,
                is_active: None,
                allowed_category_slugs: Some(vec!["geral".to_string()]),
            },
        )
        .await
        .expect("create");

    let promoted = portal
        .users
        .update_user(
            &admin,
            created.id,
            UserDraft {
                name: "Rui Revisor".to_string(),
                email: "rui@liga.local".to_string(),
                password: None,
                role: Role::Tjd,
                is_active: None,
                allowed_category_slugs: None,
            },
        )
        .await
        .expect("promote");
    assert_eq!(
        promoted.allowed_category_slugs,
        vec![TJD_CATEGORY_SLUG.to_string()]
    );
}

#[tokio::test]
async fn account_management_is_admin_only() {
    let portal = portal();
    let editor = actor(&portal, Role::Editor).await;

    let result = portal
        .users
        .create_user(
            &editor,
            UserDraft {
                name: "Qualquer".to_string(),
                email: "qualquer@liga.local".to_string(),
                password: Some("segredo123".to_string()),
                role: Role::Reader,
                is_active: None,
                allowed_category_slugs: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Permission(_))));
}

#[tokio::test]
async fn category_selectors_follow_the_resolved_role_scope() {
    let portal = portal();
    let editor = actor(&portal, Role::Editor).await;
    let tjd = actor(&portal, Role::Tjd).await;
    let admin = actor(&portal, Role::Admin).await;

    let for_editor = portal
        .categories
        .allowed_categories_for(Some(&editor))
        .await
        .expect("selector");
    let slugs: Vec<&str> = for_editor.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(slugs, vec!["atas", "geral"]);

    let for_tjd = portal
        .categories
        .allowed_categories_for(Some(&tjd))
        .await
        .expect("selector");
    assert_eq!(for_tjd.len(), 1);
    assert_eq!(for_tjd[0].slug, TJD_CATEGORY_SLUG);

    let for_admin = portal
        .categories
        .allowed_categories_for(Some(&admin))
        .await
        .expect("selector");
    assert_eq!(for_admin.len(), 4);

    let anonymous = portal
        .categories
        .allowed_categories_for(None)
        .await
        .expect("selector");
    assert!(anonymous.is_empty());
}

#[tokio::test]
async fn readers_cannot_manage_the_catalog() {
    let portal = portal();
    let reader = actor(&portal, Role::Reader).await;

    let result = portal
        .categories
        .create_category(
            &reader,
            CategoryDraft {
                name: "Clandestina".to_string(),
                ..CategoryDraft::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Permission(_))));
}

#[tokio::test]
async fn login_is_case_insensitive_and_rejects_bad_credentials() {
    let portal = portal();

    let (session, user) = portal
        .auth
        .login("ADMIN@liga.local", "123456", SEEDED_AT)
        .await
        .expect("login");
    assert_eq!(user.role, Role::Admin);
    assert!(!session.token.is_empty());

    let denied = portal.auth.login("admin@liga.local", "errada", SEEDED_AT).await;
    assert!(matches!(denied, Err(AppError::Auth(_))));

    let unknown = portal
        .auth
        .login("ninguem@liga.local", "123456", SEEDED_AT)
        .await;
    assert!(matches!(unknown, Err(AppError::Auth(_))));
}

#[tokio::test]
async fn inactive_users_cannot_login() {
    let portal = portal();
    let admin = actor(&portal, Role::Admin).await;
    let editor = actor(&portal, Role::Editor).await;

    portal
        .users
        .update_user(
            &admin,
            editor.id,
            UserDraft {
                name: editor.name.clone(),
                email: editor.email.clone(),
                password: None,
                role: Role::Editor,
                is_active: Some(false),
                allowed_category_slugs: Some(editor.allowed_category_slugs.clone()),
            },
        )
        .await
        .expect("deactivate");

    let denied = portal.auth.login(&editor.email, "123456", SEEDED_AT).await;
    assert!(matches!(denied, Err(AppError::Auth(_))));
}

#[tokio::test]
async fn sessions_expire_lazily_on_access() {
    let portal = portal();

    let (session, _) = portal
        .auth
        .login("admin@liga.local", "123456", SEEDED_AT)
        .await
        .expect("login");

    let still_valid = portal
        .auth
        .current_user(&session.token, SEEDED_AT + time::Duration::hours(11))
        .await;
    assert!(still_valid.is_ok());

    let expired = portal
        .auth
        .current_user(&session.token, SEEDED_AT + time::Duration::hours(13))
        .await;
    assert!(matches!(expired, Err(AppError::Auth(_))));

    // The expired session was removed on access.
    let gone = portal
        .store
        .find_session(&session.token)
        .await
        .expect("lookup");
    assert!(gone.is_none());
}

#[tokio::test]
async fn logout_is_best_effort_and_idempotent() {
    let portal = portal();

    let (session, _) = portal
        .auth
        .login("admin@liga.local", "123456", SEEDED_AT)
        .await
        .expect("login");

    portal.auth.logout(&session.token).await;
    portal.auth.logout(&session.token).await;

    let denied = portal.auth.current_user(&session.token, SEEDED_AT).await;
    assert!(matches!(denied, Err(AppError::Auth(_))));
}
