// Domain data function tests against an in-memory store
use super::*;
use proptest::prelude::*;
use serde_json::json;

fn data() -> PortfolioData {
    PortfolioData::new(PortfolioStore::open_in_memory().unwrap())
}

fn skill_input(name: &str) -> SkillInput {
    SkillInput {
        name: name.to_string(),
        category: Some("languages".to_string()),
        proficiency: Some(4),
        is_featured: true,
        sort_order: None,
        icon: None,
    }
}

fn experience_input(company: &str, sort_order: i64) -> ExperienceInput {
    ExperienceInput {
        company: company.to_string(),
        position: "Engineer".to_string(),
        location: None,
        start_date: "2020-01".to_string(),
        end_date: None,
        description: None,
        sort_order: Some(sort_order),
    }
}

fn achievement(description: &str) -> AchievementInput {
    AchievementInput {
        description: description.to_string(),
        sort_order: None,
    }
}

fn project_input(slug: &str, technologies: &[&str]) -> ProjectInput {
    ProjectInput {
        slug: slug.to_string(),
        title: format!("Project {}", slug),
        summary: None,
        description: None,
        status: ProjectStatus::Published,
        repo_url: None,
        live_url: None,
        thumbnail_url: None,
        sort_order: None,
        technologies: technologies.iter().map(|t| t.to_string()).collect(),
        images: vec![],
    }
}

#[tokio::test]
async fn test_profile_set_keeps_created_at() {
    let data = data();
    assert!(data.get_profile().await.unwrap().is_none());

    let input = ProfileInput {
        name: "Ada".to_string(),
        title: "Engineer".to_string(),
        bio: None,
        email: None,
        location: None,
        avatar_url: None,
        resume_url: None,
        social_links: Default::default(),
    };
    let first = data.set_profile(input.clone()).await.unwrap().value;

    let mut renamed = input;
    renamed.title = "Principal Engineer".to_string();
    let second = data.set_profile(renamed).await.unwrap();

    assert_eq!(second.value.created_at, first.created_at);
    assert_eq!(second.changes.len(), 1);
    assert_eq!(second.changes[0].key(), "profile");
    let stored = data.get_profile().await.unwrap().unwrap();
    assert_eq!(stored.title, "Principal Engineer");
}

#[tokio::test]
async fn test_update_skill_merges_and_preserves_identity() {
    let data = data();
    let created = data.create_skill("s1", skill_input("Rust")).await.unwrap().value;

    let updated = data
        .update_skill(
            "s1",
            &json!({"name": "Rust 2021", "id": "hijack", "created_at": 0, "proficiency": 5}),
        )
        .await
        .unwrap()
        .value;

    assert_eq!(updated.id, "s1");
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.name, "Rust 2021");
    assert_eq!(updated.proficiency, Some(5));
    // untouched fields survive the merge
    assert_eq!(updated.category.as_deref(), Some("languages"));

    let history = data.get_history("skill:s1").await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_update_missing_skill_is_not_found() {
    let data = data();
    let err = data.update_skill("ghost", &json!({"name": "x"})).await.unwrap_err();
    assert!(matches!(err, DataError::NotFound { kind: "skill", .. }));
}

#[tokio::test]
async fn test_update_skill_rejects_bad_patch() {
    let data = data();
    data.create_skill("s1", skill_input("Rust")).await.unwrap();

    let err = data.update_skill("s1", &json!({"proficiency": 9})).await.unwrap_err();
    assert!(matches!(err, DataError::InvalidInput(_)));
    let err = data.update_skill("s1", &json!({"name": 42})).await.unwrap_err();
    assert!(matches!(err, DataError::InvalidInput(_)));
    assert_eq!(data.get_history("skill:s1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_experience_achievements_attached_in_order() {
    let data = data();
    data.create_experience(
        "late",
        experience_input("Later Co", 2),
        vec![achievement("shipped"), achievement("scaled")],
    )
    .await
    .unwrap();
    data.create_experience("early", experience_input("Early Co", 1), vec![achievement("joined")])
        .await
        .unwrap();

    let all = data.get_all_experiences().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].experience.id, "early");
    assert_eq!(all[1].experience.id, "late");
    let descriptions: Vec<_> = all[1].achievements.iter().map(|a| a.description.as_str()).collect();
    assert_eq!(descriptions, vec!["shipped", "scaled"]);
}

#[tokio::test]
async fn test_update_with_empty_achievements_removes_all() {
    let data = data();
    data.create_experience(
        "e1",
        experience_input("Acme", 0),
        vec![achievement("a"), achievement("b"), achievement("c")],
    )
    .await
    .unwrap();

    let applied = data
        .update_experience_with_achievements("e1", &json!({"position": "Lead"}), vec![])
        .await
        .unwrap();

    assert!(applied.value.achievements.is_empty());
    assert_eq!(applied.value.experience.position, "Lead");
    let removals = applied
        .changes
        .iter()
        .filter(|c| matches!(c, Change::Remove { .. }))
        .count();
    assert_eq!(removals, 3);

    let fetched = data.get_experience("e1").await.unwrap().unwrap();
    assert!(fetched.achievements.is_empty());
}

#[tokio::test]
async fn test_replaced_achievements_start_at_version_one() {
    let data = data();
    data.create_experience("e1", experience_input("Acme", 0), vec![achievement("old")])
        .await
        .unwrap();

    let applied = data
        .update_experience_with_achievements("e1", &json!({}), vec![achievement("new")])
        .await
        .unwrap();

    let fresh = &applied.value.achievements[0];
    assert_eq!(fresh.description, "new");
    let history = data.get_history(&format!("achievement:{}", fresh.id)).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].version, 1);
}

#[tokio::test]
async fn test_failed_compound_update_changes_nothing() {
    let data = data();
    data.create_experience("e1", experience_input("Acme", 0), vec![achievement("keep me")])
        .await
        .unwrap();

    // the second achievement is invalid, so the whole update must roll back
    let err = data
        .update_experience_with_achievements(
            "e1",
            &json!({"company": "Renamed"}),
            vec![achievement("fine"), achievement("   ")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::InvalidInput(_)));

    let fetched = data.get_experience("e1").await.unwrap().unwrap();
    assert_eq!(fetched.experience.company, "Acme");
    assert_eq!(fetched.achievements.len(), 1);
    assert_eq!(fetched.achievements[0].description, "keep me");
}

#[tokio::test]
async fn test_delete_experience_cascades() {
    let data = data();
    data.create_experience("e1", experience_input("Acme", 0), vec![achievement("a"), achievement("b")])
        .await
        .unwrap();

    data.delete_experience("e1").await.unwrap();

    assert!(data.get_experience("e1").await.unwrap().is_none());
    let achievements = data
        .store()
        .list_active_by_type(RecordType::Achievement)
        .await
        .unwrap();
    assert!(achievements.is_empty());
    assert!(matches!(
        data.delete_experience("e1").await.unwrap_err(),
        DataError::NotFound { .. }
    ));
}

#[tokio::test]
async fn test_orphan_achievements_are_ignored() {
    let data = data();
    data.store()
        .set_active(
            "achievement:orphan",
            RecordType::Achievement,
            &json!({"id": "orphan", "experience_id": "missing", "description": "x", "sort_order": null, "created_at": 0}),
        )
        .await
        .unwrap();
    data.create_experience("e1", experience_input("Acme", 0), vec![])
        .await
        .unwrap();

    let all = data.get_all_experiences().await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].achievements.is_empty());
    assert_eq!(data.get_dashboard_stats().await.unwrap().total_achievements, 0);
}

#[tokio::test]
async fn test_project_technologies_replace_all() {
    let data = data();
    data.create_project("p1", project_input("demo", &["go", "postgres"]))
        .await
        .unwrap();

    let fetched = data.get_project_by_slug("demo").await.unwrap().unwrap();
    assert_eq!(fetched.technologies, vec!["go", "postgres"]);

    data.update_project("p1", &json!({}), Some(vec!["go".to_string()]), None)
        .await
        .unwrap();

    let fetched = data.get_project_by_slug("demo").await.unwrap().unwrap();
    assert_eq!(fetched.technologies, vec!["go"]);
}

#[tokio::test]
async fn test_project_update_without_children_keeps_them() {
    let data = data();
    let mut input = project_input("gallery", &["rust"]);
    input.images = vec![
        ProjectImageInput {
            url: "https://img/2.png".to_string(),
            caption: None,
            sort_order: Some(2),
        },
        ProjectImageInput {
            url: "https://img/1.png".to_string(),
            caption: Some("first".to_string()),
            sort_order: Some(1),
        },
    ];
    data.create_project("p1", input).await.unwrap();

    let updated = data
        .update_project("p1", &json!({"title": "Gallery"}), None, None)
        .await
        .unwrap()
        .value;

    assert_eq!(updated.project.title, "Gallery");
    assert_eq!(updated.technologies, vec!["rust"]);
    let urls: Vec<_> = updated.images.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec!["https://img/1.png", "https://img/2.png"]);
}

#[tokio::test]
async fn test_duplicate_slug_is_conflict() {
    let data = data();
    data.create_project("p1", project_input("demo", &[])).await.unwrap();
    data.create_project("p2", project_input("other", &[])).await.unwrap();

    let err = data.create_project("p3", project_input("demo", &[])).await.unwrap_err();
    assert!(matches!(err, DataError::Conflict(_)));

    let err = data
        .update_project("p2", &json!({"slug": "demo"}), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Conflict(_)));
    assert!(data.get_project("p3").await.unwrap().is_none());
    assert_eq!(data.get_project("p2").await.unwrap().unwrap().project.slug, "other");
}

#[tokio::test]
async fn test_delete_project_cascades() {
    let data = data();
    data.create_project("p1", project_input("demo", &["go"])).await.unwrap();

    let applied = data.delete_project("p1").await.unwrap();
    let removed: Vec<_> = applied.changes.iter().map(|c| c.key().to_string()).collect();
    assert!(removed.contains(&"project_tech:p1:go".to_string()));
    assert!(removed.contains(&"project:p1".to_string()));
    assert!(data
        .store()
        .list_active_by_type(RecordType::ProjectTech)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_reorder_with_unknown_id_applies_nothing() {
    let data = data();
    data.create_skill("a", skill_input("A")).await.unwrap();
    data.create_skill("b", skill_input("B")).await.unwrap();

    let err = data
        .update_skill_order(&[
            SortOrderUpdate { id: "a".to_string(), sort_order: 5 },
            SortOrderUpdate { id: "missing".to_string(), sort_order: 6 },
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::NotFound { .. }));
    assert_eq!(data.get_skill("a").await.unwrap().unwrap().sort_order, None);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let data = data();
    data.create_skill("a", skill_input("A")).await.unwrap();
    let mut hidden = skill_input("B");
    hidden.is_featured = false;
    data.create_skill("b", hidden).await.unwrap();
    data.create_project("p1", project_input("one", &["go"])).await.unwrap();
    let mut draft = project_input("two", &[]);
    draft.status = ProjectStatus::Draft;
    data.create_project("p2", draft).await.unwrap();
    data.create_experience("e1", experience_input("Acme", 0), vec![achievement("x"), achievement("y")])
        .await
        .unwrap();

    let stats = data.get_dashboard_stats().await.unwrap();
    assert_eq!(stats.featured_skills, 1);
    assert_eq!(stats.published_projects, 1);
    assert_eq!(stats.total_achievements, 2);
    assert_eq!(stats.counts.get(&RecordType::Skill).unwrap().count, 2);
    assert_eq!(stats.counts.get(&RecordType::ProjectTech).unwrap().count, 1);
    assert_eq!(
        stats.counts.get(&RecordType::Achievement).unwrap().count as usize,
        stats.total_achievements
    );
    assert!(stats.last_updated.is_some());
}

#[tokio::test]
async fn test_rollback_reports_restored_item() {
    let data = data();
    data.create_skill("s1", skill_input("Rust")).await.unwrap();
    data.update_skill("s1", &json!({"name": "Go"})).await.unwrap();

    let applied = data.rollback("skill:s1", 1).await.unwrap();
    assert_eq!(applied.value.version, 1);
    match &applied.changes[0] {
        Change::Upsert { item: PortfolioItem::Skill(skill), .. } => assert_eq!(skill.name, "Rust"),
        other => panic!("unexpected change {:?}", other),
    }
    assert_eq!(data.get_skill("s1").await.unwrap().unwrap().name, "Rust");
}

#[tokio::test]
async fn test_rollback_to_taken_slug_is_conflict() {
    let data = data();
    data.create_project("p1", project_input("demo", &[])).await.unwrap();
    data.update_project("p1", &json!({"slug": "renamed"}), None, None)
        .await
        .unwrap();
    data.create_project("p2", project_input("demo", &[])).await.unwrap();

    let err = data.rollback("project:p1", 1).await.unwrap_err();
    assert!(matches!(err, DataError::Conflict(_)));

    assert_eq!(data.get_project("p1").await.unwrap().unwrap().project.slug, "renamed");
    assert_eq!(data.get_project_by_slug("demo").await.unwrap().unwrap().project.id, "p2");
    let history = data.get_history("project:p1").await.unwrap();
    assert!(history.iter().any(|r| r.version == 2 && r.is_active));
}

#[tokio::test]
async fn test_rollback_project_to_free_slug() {
    let data = data();
    data.create_project("p1", project_input("demo", &[])).await.unwrap();
    data.update_project("p1", &json!({"slug": "renamed"}), None, None)
        .await
        .unwrap();

    data.rollback("project:p1", 1).await.unwrap();
    assert_eq!(data.get_project_by_slug("demo").await.unwrap().unwrap().project.id, "p1");
}

#[tokio::test]
async fn test_project_join_ignores_input_order() {
    let data = data();
    for (id, slug) in [("p3", "zeta"), ("p1", "alpha"), ("p2", "mid")] {
        data.create_project(id, project_input(slug, &[])).await.unwrap();
    }
    let projects: Vec<Project> = data
        .store()
        .list_active_by_type(RecordType::Project)
        .await
        .unwrap()
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();
    let mut reversed = projects.clone();
    reversed.reverse();

    let ids = |views: Vec<ProjectView>| -> Vec<String> {
        views.into_iter().map(|v| v.project.id).collect()
    };
    let forward = ids(join::attach_project_children(projects, vec![], vec![]));
    let backward = ids(join::attach_project_children(reversed, vec![], vec![]));
    assert_eq!(forward, backward);
}

#[tokio::test]
async fn test_fetch_all_items_tags_every_record() {
    let data = data();
    data.create_skill("a", skill_input("A")).await.unwrap();
    data.create_project("p1", project_input("demo", &["go"])).await.unwrap();

    let items = data.fetch_all_items().await.unwrap();
    let keys: Vec<_> = items.iter().map(|(k, _)| k.as_str()).collect();
    assert!(keys.contains(&"skill:a"));
    assert!(keys.contains(&"project:p1"));
    assert!(keys.contains(&"project_tech:p1:go"));
    for (key, item) in &items {
        assert!(key.starts_with(item.record_type().as_str()));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // Two reorders over disjoint id sets, run concurrently, both land
    #[test]
    fn prop_concurrent_disjoint_reorders_both_apply(partition in prop::collection::vec(any::<bool>(), 2..12)) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let data = data();
            let ids: Vec<String> = (0..partition.len()).map(|i| format!("s{}", i)).collect();
            for id in &ids {
                data.create_skill(id, skill_input(id)).await.unwrap();
            }

            let (left, right): (Vec<_>, Vec<_>) = ids
                .iter()
                .zip(&partition)
                .enumerate()
                .map(|(index, (id, side))| {
                    (SortOrderUpdate { id: id.clone(), sort_order: 100 + index as i64 }, *side)
                })
                .partition(|(_, side)| *side);
            let left: Vec<_> = left.into_iter().map(|(u, _)| u).collect();
            let right: Vec<_> = right.into_iter().map(|(u, _)| u).collect();

            let left_data = data.clone();
            let right_data = data.clone();
            let left_updates = left.clone();
            let right_updates = right.clone();
            let (a, b) = tokio::join!(
                tokio::spawn(async move { left_data.update_skill_order(&left_updates).await }),
                tokio::spawn(async move { right_data.update_skill_order(&right_updates).await }),
            );
            a.unwrap().unwrap();
            b.unwrap().unwrap();

            for update in left.iter().chain(right.iter()) {
                let skill = data.get_skill(&update.id).await.unwrap().unwrap();
                assert_eq!(skill.sort_order, Some(update.sort_order));
            }
        });
    }
}
