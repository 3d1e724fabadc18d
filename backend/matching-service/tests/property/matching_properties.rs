use chrono::{DateTime, Duration, TimeZone, Utc};
use matching_service::models::{
    AffinityAttribute, AuthorProfile, Candidate, CandidateDetails, EngagementCounters, Factor,
    JobAttributes, PostAttributes, TrustTier, ViewerContext,
};
use matching_service::services::ranking::{compare_ranked, PageRequest, Ranker, RankerSettings};
use matching_service::services::signals::{
    engagement_score, experience_match, industry_match, location_match, quality_score,
    recency_decay, recency_step, salary_band, salary_match, skill_match, EngagementWeights,
    SignalInput, SignalRegistry, OVER_QUALIFICATION_FLOOR, SALARY_LOWER_FROM_MAX,
    SALARY_UPPER_FROM_MIN,
};
use matching_service::services::{Scorer, WeightProfile};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn in_unit(score: f64) -> bool {
    score.is_finite() && (0.0..=1.0).contains(&score)
}

fn tier() -> impl Strategy<Value = TrustTier> {
    prop_oneof![
        Just(TrustTier::Elder),
        Just(TrustTier::Mentor),
        Just(TrustTier::Verified),
        Just(TrustTier::Trusted),
        Just(TrustTier::Normal),
        Just(TrustTier::New),
    ]
}

fn affinity_set() -> impl Strategy<Value = BTreeSet<AffinityAttribute>> {
    prop::collection::btree_set(
        prop_oneof![
            Just(AffinityAttribute::CommunityOwned),
            Just(AffinityAttribute::IdentifiedRole),
            Just(AffinityAttribute::ReconciliationPlan),
            Just(AffinityAttribute::CulturalLeave),
            Just(AffinityAttribute::CommunityEndorsed),
            Just(AffinityAttribute::MentoringProgram),
        ],
        0..6,
    )
}

fn salary() -> impl Strategy<Value = Option<f64>> {
    prop::option::of(0.0f64..500_000.0)
}

/// Well-formed bounds: min never above max
fn salary_range() -> impl Strategy<Value = (Option<f64>, Option<f64>)> {
    (salary(), salary()).prop_map(|(a, b)| match (a, b) {
        (Some(a), Some(b)) => (Some(a.min(b)), Some(a.max(b))),
        other => other,
    })
}

prop_compose! {
    fn job_candidate()(
        author_seed in 0u128..6,
        age_secs in -86_400i64..(400 * 86_400),
        skills in prop::collection::vec("[a-z ]{0,12}", 0..6),
        level in prop::option::of("[a-zA-Z ]{0,10}"),
        location in prop::option::of("[a-zA-Z ,]{0,24}"),
        remote_ok in any::<bool>(),
        salaries in salary_range(),
        industry in prop::option::of("[a-z ]{0,16}"),
        affinity in affinity_set(),
        followers in any::<u64>(),
        tier in tier(),
    ) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            author_id: Uuid::from_u128(author_seed + 1),
            created_at: now() - Duration::seconds(age_secs),
            engagement: EngagementCounters::default(),
            author: AuthorProfile { trust_tier: tier, follower_count: followers, verified: false },
            details: CandidateDetails::Job(JobAttributes {
                required_skills: skills,
                experience_level: level,
                location,
                remote_ok,
                salary_min: salaries.0,
                salary_max: salaries.1,
                employment_type: None,
                industry,
                affinity,
            }),
        }
    }
}

prop_compose! {
    fn post_candidate()(
        author_seed in 0u128..4,
        age_secs in -3_600i64..(30 * 86_400),
        likes in any::<u64>(),
        comments in 0u64..1_000_000,
        shares in 0u64..1_000_000,
        saves in 0u64..1_000_000,
        followers in 0u64..10_000_000,
        tier in tier(),
        verified in any::<bool>(),
    ) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            author_id: Uuid::from_u128(author_seed + 1),
            created_at: now() - Duration::seconds(age_secs),
            engagement: EngagementCounters { likes, comments, shares, saves, views: 0 },
            author: AuthorProfile { trust_tier: tier, follower_count: followers, verified },
            details: CandidateDetails::Post(PostAttributes::default()),
        }
    }
}

prop_compose! {
    fn viewer_context()(
        skills in prop::collection::vec("[a-z ]{0,12}", 0..6),
        years in prop::option::of(-5.0f64..60.0),
        location in prop::option::of("[a-zA-Z ,]{0,24}"),
        wants_remote in any::<bool>(),
        salary_min in prop::option::of(-10.0f64..500_000.0),
        industries in prop::collection::vec("[a-z ]{0,16}", 0..3),
        opt_in in any::<bool>(),
        preferences in affinity_set(),
        follows_seed in prop::collection::btree_set(1u128..7, 0..3),
    ) -> ViewerContext {
        let mut viewer = ViewerContext::anonymous(Uuid::new_v4());
        viewer.skills = skills;
        viewer.experience_years = years;
        viewer.location = location;
        viewer.wants_remote = wants_remote;
        viewer.salary_min = salary_min;
        viewer.industries = industries;
        viewer.affinity_opt_in = opt_in;
        viewer.affinity_preferences = preferences;
        viewer.following = follows_seed.into_iter().map(Uuid::from_u128).collect();
        viewer
    }
}

fn any_candidate() -> impl Strategy<Value = Candidate> {
    prop_oneof![job_candidate(), post_candidate()]
}

fn max_author_run(authors: &[Uuid]) -> usize {
    let mut best = 0;
    let mut run = 0;
    for (i, author) in authors.iter().enumerate() {
        run = if i > 0 && authors[i - 1] == *author { run + 1 } else { 1 };
        best = best.max(run);
    }
    best
}

proptest! {
    #[test]
    fn skill_match_in_range(
        required in prop::collection::vec(".{0,10}", 0..8),
        viewer in prop::collection::vec(".{0,10}", 0..8),
    ) {
        prop_assert!(in_unit(skill_match(&required, &viewer)));
    }

    #[test]
    fn experience_match_in_range(
        level in prop::option::of(".{0,12}"),
        years in prop::option::of(any::<f64>()),
    ) {
        let score = experience_match(level.as_deref(), years, OVER_QUALIFICATION_FLOOR);
        prop_assert!(in_unit(score));
    }

    #[test]
    fn location_match_in_range(
        job in prop::option::of(".{0,30}"),
        remote_ok in any::<bool>(),
        viewer in prop::option::of(".{0,30}"),
        wants_remote in any::<bool>(),
    ) {
        let score = location_match(job.as_deref(), remote_ok, viewer.as_deref(), wants_remote);
        prop_assert!(in_unit(score));
    }

    #[test]
    fn industry_match_in_range(
        job in prop::option::of(".{0,20}"),
        preferences in prop::collection::vec(".{0,20}", 0..4),
    ) {
        prop_assert!(in_unit(industry_match(job.as_deref(), &preferences)));
    }

    #[test]
    fn salary_match_in_range(
        min in salary(),
        max in salary(),
        viewer_min in prop::option::of(any::<f64>()),
    ) {
        let band = salary_band(min, max, SALARY_UPPER_FROM_MIN, SALARY_LOWER_FROM_MAX);
        prop_assert!(in_unit(salary_match(band, viewer_min)));
    }

    #[test]
    fn recency_in_range_and_ordered(
        age_secs in -864_000i64..(3_650 * 86_400),
        half_life in 0.01f64..1_000.0,
    ) {
        let created_at = now() - Duration::seconds(age_secs);
        let older = created_at - Duration::hours(1);
        prop_assert!(in_unit(recency_step(created_at, now())));
        prop_assert!(in_unit(recency_decay(created_at, now(), half_life)));
        prop_assert!(recency_step(older, now()) <= recency_step(created_at, now()));
        prop_assert!(recency_decay(older, now(), half_life) <= recency_decay(created_at, now(), half_life));
    }

    #[test]
    fn engagement_in_range(
        likes in any::<u64>(),
        comments in any::<u64>(),
        shares in any::<u64>(),
        saves in any::<u64>(),
        views in any::<u64>(),
    ) {
        let counters = EngagementCounters { likes, comments, shares, saves, views };
        prop_assert!(in_unit(engagement_score(&counters, &EngagementWeights::default())));
    }

    #[test]
    fn quality_in_range(tier in tier(), followers in any::<u64>(), verified in any::<bool>()) {
        let author = AuthorProfile { trust_tier: tier, follower_count: followers, verified };
        prop_assert!(in_unit(quality_score(&author)));
    }

    #[test]
    fn every_registered_signal_in_range(candidate in any_candidate(), viewer in viewer_context()) {
        let registry = SignalRegistry::default();
        let input = SignalInput { candidate: &candidate, viewer: &viewer, now: now() };
        for factor in Factor::ALL {
            let score = registry.get(factor).unwrap().compute(&input);
            prop_assert!(in_unit(score), "{} produced {}", factor, score);
        }
    }

    #[test]
    fn ranked_sequence_properties(
        candidates in prop::collection::vec(any_candidate(), 0..40),
        viewer in viewer_context(),
        max_consecutive in 1usize..4,
        page_size in 1usize..12,
    ) {
        let ranker = Ranker::new(
            Scorer::default(),
            RankerSettings { max_consecutive_from_author: max_consecutive, ..Default::default() },
        );
        let profile = WeightProfile::new(
            "mixed",
            1,
            [("skill_match", 0.3), ("salary_match", 0.2), ("engagement", 0.3), ("quality", 0.2)],
        )
        .unwrap();

        let full = ranker.rank_all(&candidates, &viewer, &profile, now());

        // Diversity cap holds over the whole sequence
        let authors: Vec<Uuid> = full.iter().map(|s| s.candidate.author_id).collect();
        prop_assert!(max_author_run(&authors) <= max_consecutive);
        prop_assert!(full.iter().all(|s| in_unit(s.score)));
        prop_assert!(full.len() <= candidates.len());

        // Each author's items keep score order
        let mut last_by_author: HashMap<Uuid, f64> = HashMap::new();
        for item in &full {
            if let Some(previous) = last_by_author.insert(item.candidate.author_id, item.score) {
                prop_assert!(previous >= item.score);
            }
        }

        // Sorted order up to the first item diversity had to defer
        let mut sorted: Vec<_> = Scorer::default()
            .score_all(&candidates, &viewer, &profile, now())
            .into_iter()
            .filter_map(Result::ok)
            .collect();
        sorted.sort_by(compare_ranked);
        let deferred_at = full
            .iter()
            .zip(&sorted)
            .position(|(ranked, expected)| ranked.candidate.id != expected.candidate.id)
            .unwrap_or(full.len());
        if deferred_at < sorted.len() {
            let held_back = sorted[deferred_at].candidate.author_id;
            prop_assert!(deferred_at >= max_consecutive);
            prop_assert!(full[deferred_at - max_consecutive..deferred_at]
                .iter()
                .all(|s| s.candidate.author_id == held_back));
        }

        // Walking pages reproduces the full sequence exactly once
        let mut walked = Vec::new();
        let mut request = PageRequest::first(page_size);
        loop {
            let page = ranker.rank(&candidates, &viewer, &profile, &request, now()).unwrap();
            prop_assert_eq!(page.total_count, full.len());
            prop_assert!(page.items.len() <= page_size);
            walked.extend(page.items.iter().map(|s| s.candidate.id));
            match page.next_cursor {
                Some(cursor) => request = PageRequest::after(cursor, page_size),
                None => break,
            }
        }
        let expected: Vec<Uuid> = full.iter().map(|s| s.candidate.id).collect();
        prop_assert_eq!(walked, expected);

        // Same inputs, same page
        let a = ranker.rank(&candidates, &viewer, &profile, &PageRequest::first(page_size), now()).unwrap();
        let b = ranker.rank(&candidates, &viewer, &profile, &PageRequest::first(page_size), now()).unwrap();
        prop_assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
