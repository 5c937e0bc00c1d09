//! Full wiring demo: a user-account entity behind the composed stack
//!
//! Builds permission ∘ validation ∘ audit ∘ in-memory storage, exercises
//! the stack directly, then exposes it over HTTP.

use anyhow::Result;
use scaffold::prelude::*;
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
struct UserAccount {
    id: Uuid,
    #[validate(length(min = 3))]
    username: String,
    #[validate(email)]
    email: String,
    password: String,
    age: i64,
}

impl_record!(UserAccount {
    id: Uuid,
    username: String,
    email: String,
    password: String,
    age: i64,
});

impl Entity for UserAccount {
    fn kind() -> EntityKind {
        EntityKind::new("user")
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.username
    }
}

/// What leaves the service: same shape, password never copied
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PublicUser {
    id: Uuid,
    username: String,
    email: String,
    password: String,
    age: i64,
}

impl_record!(PublicUser {
    id: Uuid,
    username: String,
    email: String,
    password: String,
    age: i64,
});

fn account(username: &str, email: &str, age: i64) -> UserAccount {
    UserAccount {
        id: Uuid::nil(),
        username: username.to_string(),
        email: email.to_string(),
        password: "$argon2$demo".to_string(),
        age,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("🚀 Scaffold Users API Demo\n");

    let config = AppConfig::default();

    // Bottom of the stack: the storage adapter, plus a second repository
    // that holds nothing but the audit trail.
    let repo = Arc::new(MemoryRepository::<UserAccount>::new());
    let trail = Arc::new(MemoryRepository::<AuditRecord>::new());

    // Audit, then payload validation, then permission checks. Outermost
    // runs first, so a denied caller leaves no audit record.
    let audited: Arc<dyn CrudService<UserAccount>> = if config.audit_enabled {
        Arc::new(audit_layer(
            repo.clone() as Arc<dyn CrudService<UserAccount>>,
            trail.clone() as Arc<dyn AuditSink>,
        ))
    } else {
        repo.clone()
    };

    let mut validated = HookedService::new(audited);
    validated.on_before_create(|_ctx, input| {
        Box::pin(async move {
            let Some(user) = input.entity() else {
                return Ok(());
            };
            // InvalidPayload maps to 400 at the HTTP boundary.
            user.validate().map_err(|e| Error::invalid_payload(e.to_string()))
        })
    });

    let stack = Arc::new(permission_layer(
        Arc::new(validated) as Arc<dyn CrudService<UserAccount>>
    ));

    // Two principals: an admin with full grants, a reader with READ only.
    let admin = Principal::new(Uuid::new_v4(), "admin")
        .with_role(RoleGrant::new(
            "administrators",
            vec![
                Grant::new("user", Operation::Create),
                Grant::new("user", Operation::Read),
                Grant::new("user", Operation::Update),
                Grant::new("user", Operation::Delete),
            ],
        ));
    let reader =
        Principal::new(Uuid::new_v4(), "reader").with_grant(Grant::new("user", Operation::Read));

    let admin_ctx = RequestContext::new(admin.clone())
        .with_origin(RequestOrigin::new("127.0.0.1", "users-api-demo/0.1"));
    let reader_ctx = RequestContext::new(reader.clone());

    println!("📋 Creating users as admin...\n");
    for (name, email, age) in [
        ("alice", "alice@example.com", 34),
        ("bob", "bob@example.com", 41),
        ("carol", "carol@example.com", 28),
    ] {
        let created = stack.create(&admin_ctx, account(name, email, age)).await?;
        println!("✅ Created {} ({})", created.username, created.id);
    }

    // A payload the validation hook rejects before storage sees it.
    let bad = stack.create(&admin_ctx, account("x", "not-an-email", 1)).await;
    println!("❌ Invalid payload rejected: {}", bad.unwrap_err());

    // A caller the permission layer stops cold.
    let denied = stack.create(&reader_ctx, account("mallory", "m@example.com", 99)).await;
    println!("❌ Reader cannot create: {}\n", denied.unwrap_err());

    println!("🔍 Querying...\n");
    let filter = Filter::parse("and(age:ge:30,username:like:%a%)")?;
    let page = stack
        .find_all(
            &reader_ctx,
            Pageable::new(1, 10),
            Some(&filter),
            &[],
            &[OrderBy::asc("username")],
        )
        .await?;
    println!(
        "📄 {} of {} users match `{}`:",
        page.filtered, page.total, filter
    );
    for user in &page.content {
        println!("   {} <{}> age {}", user.username, user.email, user.age);
    }

    // Records leave the service through the mapper, password stripped.
    let strip_password = Mapper::<UserAccount, PublicUser>::excluding(&["password"])?;
    let sanitized = strip_password.map(&page.content[0]);
    println!(
        "\n🔒 Sanitized: {} has password {:?}",
        sanitized.username, sanitized.password
    );

    // Every mutation above, success or failure, left a trail entry.
    let audits = trail
        .find_all(&admin_ctx, Pageable::new(1, 50), None, &[], &[])
        .await?;
    println!("\n📜 Audit trail ({} entries):", audits.total);
    for entry in &audits.content {
        println!(
            "   {} {} {} → {}",
            entry.action, entry.entity, entry.entity_id, entry.result
        );
    }

    println!("\n🌐 Serving on http://{} ...", config.server.bind_addr());
    ServerBuilder::new()
        .with_resolver(StaticPrincipalResolver::new(admin))
        .with_config(&config)
        .expose_entity::<UserAccount>(stack)
        .serve(&config.server.bind_addr())
        .await
}
