//! Behavior of the composed stack: permission over audit over storage

mod harness;

use harness::*;
use scaffold::core::audit::{AuditAction, AuditOutcome};
use scaffold::core::error::Error;
use scaffold::core::filter::Filter;
use scaffold::core::order::OrderBy;
use scaffold::core::page::Pageable;
use scaffold::core::service::CrudService;
use std::time::{Duration, Instant};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_first_page_of_five_rows_sorted_by_name() {
    let stack = stacked();
    stack.repo.seed(roster()).expect("seed should succeed");
    let ctx = ctx(reader());

    let page = stack
        .service
        .find_all(
            &ctx,
            Pageable::new(1, 2),
            None,
            &[],
            &[OrderBy::asc("name")],
        )
        .await
        .expect("listing should succeed");

    assert_eq!(page.total, 5);
    assert_eq!(page.filtered, 5);
    assert_eq!(page.content.len(), 2);
    let names: Vec<&str> = page.content.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["ada", "ben"]);
}

#[tokio::test]
async fn test_filtered_count_diverges_from_total() {
    let stack = stacked();
    stack.repo.seed(roster()).expect("seed should succeed");
    let ctx = ctx(reader());

    let filter = Filter::parse("age:ge:41").expect("filter should parse");
    let page = stack
        .service
        .find_all(
            &ctx,
            Pageable::new(1, 10),
            Some(&filter),
            &[],
            &[OrderBy::desc("age")],
        )
        .await
        .expect("listing should succeed");

    assert_eq!(page.total, 5);
    assert_eq!(page.filtered, 3);
    let ages: Vec<i64> = page.content.iter().map(|e| e.age).collect();
    assert_eq!(ages, [52, 45, 41]);
}

#[tokio::test]
async fn test_combo_projects_and_keeps_both_counts() {
    let stack = stacked();
    stack.repo.seed(roster()).expect("seed should succeed");
    let ctx = ctx(reader());

    let filter = Filter::parse("name:like:%a%").expect("filter should parse");
    let page = stack
        .service
        .combo_box(
            &ctx,
            Pageable::new(1, 10),
            Some(&filter),
            &[],
            &[OrderBy::asc("name")],
        )
        .await
        .expect("combo should succeed");

    assert_eq!(page.total, 5);
    // ada, dana, evan carry an `a`
    assert_eq!(page.filtered, 3);
    let names: Vec<&str> = page.content.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["ada", "dana", "evan"]);
    assert!(page.content.iter().all(|o| !o.id.is_nil()));
}

// ---------------------------------------------------------------------------
// Nested filters through the whole stack
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_nested_composite_filter_selects_expected_rows() {
    let stack = stacked();
    stack.repo.seed(roster()).expect("seed should succeed");
    let ctx = ctx(reader());

    // age >= 40 and (name like a% or name like c%) → ada is too young, so
    // cleo alone matches.
    let filter = Filter::parse("and(age:ge:40,or(name:like:a%,name:like:c%))")
        .expect("filter should parse");
    let page = stack
        .service
        .find_all(&ctx, Pageable::new(1, 10), Some(&filter), &[], &[])
        .await
        .expect("listing should succeed");

    assert_eq!(page.filtered, 1);
    assert_eq!(page.content[0].name, "cleo");
}

#[tokio::test]
async fn test_not_filter_inverts_its_child() {
    let stack = stacked();
    stack.repo.seed(roster()).expect("seed should succeed");
    let ctx = ctx(reader());

    let filter = Filter::parse("not(age:lt:41)").expect("filter should parse");
    let count = stack
        .service
        .count(&ctx, Some(&filter))
        .await
        .expect("count should succeed");

    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_first_respects_insertion_order() {
    let stack = stacked();
    stack.repo.seed(roster()).expect("seed should succeed");
    let ctx = ctx(reader());

    // cleo was seeded first; `first` ignores sort keys entirely.
    let first = stack
        .service
        .first(&ctx, None)
        .await
        .expect("first should succeed");
    assert_eq!(first.name, "cleo");

    let filter = Filter::parse("age:lt:40").expect("filter should parse");
    let first = stack
        .service
        .first(&ctx, Some(&filter))
        .await
        .expect("filtered first should succeed");
    assert_eq!(first.name, "ada");
}

// ---------------------------------------------------------------------------
// Permission layer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_reader_role_can_read() {
    let stack = stacked();
    stack.repo.seed(roster()).expect("seed should succeed");
    let ctx = ctx(reader());

    let id = stack
        .service
        .first(&ctx, None)
        .await
        .expect("first should succeed")
        .id;
    let found = stack
        .service
        .find_one(&ctx, id, &[])
        .await
        .expect("read grant should allow find_one");
    assert_eq!(found.id, id);
}

#[tokio::test]
async fn test_denied_write_never_reaches_storage_or_audit() {
    let stack = stacked();
    let ctx = ctx(reader());

    let result = stack.service.create(&ctx, employee("mallory", 30)).await;
    assert!(matches!(result, Err(Error::PermissionDenied { .. })));

    // The veto happened in the outermost layer: no row, no audit record.
    let admin_ctx = harness::ctx(admin());
    assert_eq!(stack.repo.count(&admin_ctx, None).await.unwrap(), 0);
    assert_eq!(stack.trail.count(&admin_ctx, None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_denied_read_never_reaches_storage() {
    let stack = stacked();
    stack.repo.seed(roster()).expect("seed should succeed");
    let ctx = ctx(nobody());

    let result = stack.service.find_one(&ctx, Uuid::new_v4(), &[]).await;
    match result {
        Err(Error::PermissionDenied { entity, user, .. }) => {
            assert_eq!(entity, "employee");
            assert_eq!(user, ctx.principal.user_id);
        }
        other => panic!("expected PermissionDenied, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Audit layer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_successful_create_leaves_one_success_record() {
    let stack = stacked();
    let ctx = ctx(admin());

    // A caller-supplied id, so the Before-stamp records it.
    let mut ada = employee("ada", 36);
    ada.id = Uuid::new_v4();
    let created = stack
        .service
        .create(&ctx, ada)
        .await
        .expect("create should succeed");

    let audits = stack
        .trail
        .find_all(&ctx, Pageable::new(1, 10), None, &[], &[])
        .await
        .expect("trail listing should succeed");
    assert_eq!(audits.total, 1);

    let entry = &audits.content[0];
    assert_eq!(entry.action, AuditAction::Create);
    assert_eq!(entry.result, AuditOutcome::Success);
    assert_eq!(entry.user_id, ctx.principal.user_id);
    assert_eq!(entry.entity, "employee");
    assert_eq!(entry.entity_id, created.id);
    assert!(entry.new_value.contains("ada"));
    assert_eq!(entry.ip, "192.0.2.10");
    assert_eq!(entry.user_agent, "harness/1.0");
}

#[tokio::test]
async fn test_failed_create_leaves_one_failure_record() {
    let stack = stacked();
    let ctx = ctx(admin());

    let existing = stack
        .service
        .create(&ctx, employee("ada", 36))
        .await
        .expect("first create should succeed");

    // Same id again forces a storage failure below the audit layer.
    let mut duplicate = employee("ada-again", 37);
    duplicate.id = existing.id;
    let dup_ctx = ctx_for_same_user(&ctx);
    let result = stack.service.create(&dup_ctx, duplicate).await;
    assert!(matches!(result, Err(Error::Storage { .. })));

    let filter = Filter::parse("result:eq:failure").expect("filter should parse");
    let failures = stack
        .trail
        .find_all(&dup_ctx, Pageable::new(1, 10), Some(&filter), &[], &[])
        .await
        .expect("trail listing should succeed");
    assert_eq!(failures.filtered, 1);

    let entry = &failures.content[0];
    assert_eq!(entry.action, AuditAction::Create);
    assert_eq!(entry.result, AuditOutcome::Failure);
    assert!(!entry.message.is_empty());
}

#[tokio::test]
async fn test_update_records_previous_value_snapshot() {
    let stack = stacked();
    let ctx = ctx(admin());

    let mut stored = stack
        .service
        .create(&ctx, employee("ben", 52))
        .await
        .expect("create should succeed");

    stored.age = 53;
    let update_ctx = ctx_for_same_user(&ctx);
    stack
        .service
        .update(&update_ctx, stored)
        .await
        .expect("update should succeed");

    let filter = Filter::parse("action:eq:update").expect("filter should parse");
    let updates = stack
        .trail
        .find_all(&update_ctx, Pageable::new(1, 10), Some(&filter), &[], &[])
        .await
        .expect("trail listing should succeed");
    assert_eq!(updates.filtered, 1);

    let entry = &updates.content[0];
    assert_eq!(entry.result, AuditOutcome::Success);
    assert!(!entry.new_value.is_empty());
    assert!(!entry.prev_value.is_empty());
}

#[tokio::test]
async fn test_successful_read_leaves_no_record() {
    let stack = stacked();
    stack.repo.seed(roster()).expect("seed should succeed");
    let ctx = ctx(admin());

    stack
        .service
        .find_all(&ctx, Pageable::new(1, 10), None, &[], &[])
        .await
        .expect("listing should succeed");

    assert_eq!(stack.trail.count(&ctx, None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_associate_links_rows_and_leaves_a_trail() {
    let stack = stacked();
    let ctx = ctx(admin());

    let ada = stack
        .service
        .create(&ctx, employee("ada", 36))
        .await
        .expect("create should succeed");
    let ben_ctx = ctx_for_same_user(&ctx);
    let ben = stack
        .service
        .create(&ben_ctx, employee("ben", 52))
        .await
        .expect("create should succeed");

    let link_ctx = ctx_for_same_user(&ctx);
    stack
        .service
        .associate(&link_ctx, ada.id, "mentees", ben.id)
        .await
        .expect("associate should succeed");
    assert_eq!(stack.repo.linked_ids(ada.id, "mentees").unwrap(), [ben.id]);

    let filter = Filter::parse("action:eq:associate").expect("filter should parse");
    assert_eq!(stack.trail.count(&link_ctx, Some(&filter)).await.unwrap(), 1);

    let unlink_ctx = ctx_for_same_user(&ctx);
    stack
        .service
        .dissociate(&unlink_ctx, ada.id, "mentees", ben.id)
        .await
        .expect("dissociate should succeed");
    assert!(stack.repo.linked_ids(ada.id, "mentees").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Deadlines
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_elapsed_deadline_fails_before_storage_work() {
    let stack = stacked();
    stack.repo.seed(roster()).expect("seed should succeed");

    let expired = ctx(admin()).with_deadline(Instant::now() - Duration::from_millis(5));
    let result = stack
        .service
        .find_all(&expired, Pageable::new(1, 10), None, &[], &[])
        .await;
    assert!(matches!(result, Err(Error::DeadlineExceeded)));

    let future = ctx(admin()).with_deadline(Instant::now() + Duration::from_secs(60));
    stack
        .service
        .find_all(&future, Pageable::new(1, 10), None, &[], &[])
        .await
        .expect("unexpired deadline should pass");
}

// One audit draft lives per context, so each mutation gets a fresh one.
fn ctx_for_same_user(previous: &scaffold::core::context::RequestContext) -> scaffold::core::context::RequestContext {
    ctx(previous.principal.clone())
}
