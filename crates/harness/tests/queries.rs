use chrono::NaiveDate;
use proptest::prelude::*;
use stashdb_core::{Alias, BodyModKind, BodyModification, Performer, PerformerEdit, PerformerId, Url};
use stashdb_harness::TestDb;
use stashdb_storage::{
    CriterionModifier, IntCriterion, PerformerFilter, PerformerRepository, PerformerSort,
    QuerySpec, SortDirection,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn born(db: &mut TestDb, name: &str, birthdate: NaiveDate) -> Result<Performer, Box<dyn std::error::Error>> {
    Ok(db.create_with(PerformerEdit {
        name: Some(name.to_string()),
        birthdate: Some(birthdate),
        ..PerformerEdit::default()
    })?)
}

fn names(performers: &[Performer]) -> Vec<&str> {
    performers.iter().map(|p| p.name.as_str()).collect()
}

fn query(
    db: &TestDb,
    filter: &PerformerFilter,
    today: NaiveDate,
) -> Result<Vec<Performer>, Box<dyn std::error::Error>> {
    let page = db
        .engine
        .storage()
        .repository()
        .query(filter, &QuerySpec::unpaged(), today)?;
    assert_eq!(page.count as usize, page.performers.len());
    Ok(page.performers)
}

// ============================================================================
// Bulk lookups
// ============================================================================

#[test]
fn find_performers_leaves_gaps_for_unknown_ids() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = TestDb::new()?;
    let first = db.create_performer("First")?;
    let third = db.create_performer("Third")?;

    let result = db
        .engine
        .find_performers(&[first.id, PerformerId::new(), third.id])?;
    assert_eq!(result.len(), 3);
    assert_eq!(result[0].as_ref().map(|p| p.id), Some(first.id));
    assert!(result[1].is_none());
    assert_eq!(result[2].as_ref().map(|p| p.id), Some(third.id));
    assert!(db.engine.find_performers(&[])?.is_empty());
    Ok(())
}

#[test]
fn lookups_by_name_alias_and_scene() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = TestDb::new()?;
    let jane = db.create_with(PerformerEdit {
        name: Some("Jane Doe".into()),
        added_aliases: vec![Alias::new("Janie")],
        ..PerformerEdit::default()
    })?;
    let john = db.create_performer("John Roe")?;
    let scene = db.link_new_scene(jane.id)?;
    db.link_scene(scene, john.id)?;

    let repo = db.engine.storage().repository();
    assert_eq!(names(&repo.find_by_name("jane doe")?), vec!["Jane Doe"]);
    assert_eq!(names(&repo.find_by_alias("JANIE")?), vec!["Jane Doe"]);
    assert_eq!(names(&repo.find_by_scene(scene)?), vec!["Jane Doe", "John Roe"]);

    let aliases = repo.all_aliases(&[john.id, jane.id])?;
    assert_eq!(aliases, vec![Vec::new(), vec![Alias::new("Janie")]]);
    Ok(())
}

#[test]
fn bulk_lookups_by_names_and_aliases() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = TestDb::new()?;
    db.create_with(PerformerEdit {
        name: Some("Jane Doe".into()),
        added_aliases: vec![Alias::new("Janie"), Alias::new("JD")],
        ..PerformerEdit::default()
    })?;
    db.create_with(PerformerEdit {
        name: Some("John Roe".into()),
        added_aliases: vec![Alias::new("Johnny")],
        ..PerformerEdit::default()
    })?;
    db.create_performer("Mary Major")?;

    let repo = db.engine.storage().repository();
    let by_names = repo.find_by_names(&["Mary Major", "Jane Doe", "jane doe", "Nobody"])?;
    assert_eq!(names(&by_names), vec!["Jane Doe", "Mary Major"]);

    let by_aliases = repo.find_by_aliases(&["JANIE", "jd", " johnny "])?;
    assert_eq!(names(&by_aliases), vec!["Jane Doe", "John Roe"]);
    assert!(repo.find_by_names(&[])?.is_empty());
    Ok(())
}

#[test]
fn bulk_attachment_lookups_are_positional() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = TestDb::new()?;
    let inked = db.create_with(PerformerEdit {
        name: Some("Inked".into()),
        added_urls: vec![Url::new("https://example.com/inked", "HOME")],
        added_tattoos: vec![
            BodyModification::new("arm", Some("rose")),
            BodyModification::new("back", None),
        ],
        ..PerformerEdit::default()
    })?;
    let pierced = db.create_with(PerformerEdit {
        name: Some("Pierced".into()),
        added_piercings: vec![BodyModification::new("ear", None)],
        ..PerformerEdit::default()
    })?;
    let unknown = PerformerId::new();

    let repo = db.engine.storage().repository();
    let ids = [pierced.id, unknown, inked.id];

    let urls = repo.all_urls(&ids)?;
    assert_eq!(urls.len(), 3);
    assert!(urls[0].is_empty() && urls[1].is_empty());
    assert_eq!(urls[2], vec![Url::new("https://example.com/inked", "HOME")]);

    let tattoos = repo.all_body_mods(BodyModKind::Tattoo, &ids)?;
    assert_eq!(tattoos.iter().map(Vec::len).collect::<Vec<_>>(), vec![0, 0, 2]);

    let piercings = repo.all_body_mods(BodyModKind::Piercing, &ids)?;
    assert_eq!(piercings[0], vec![BodyModification::new("ear", None)]);
    assert!(piercings[2].is_empty());
    Ok(())
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn birth_year_filters_against_stored_dates() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = TestDb::new()?;
    born(&mut db, "A", ymd(1989, 12, 31))?;
    born(&mut db, "B", ymd(1990, 1, 1))?;
    born(&mut db, "C", ymd(1990, 12, 31))?;
    born(&mut db, "D", ymd(1991, 1, 1))?;
    let today = ymd(2024, 6, 15);

    let by_year = |modifier| PerformerFilter {
        birth_year: Some(IntCriterion {
            value: 1990,
            modifier,
        }),
        ..PerformerFilter::default()
    };

    let equals = query(&db, &by_year(CriterionModifier::Equals), today)?;
    assert_eq!(names(&equals), vec!["B", "C"]);
    let not_equals = query(&db, &by_year(CriterionModifier::NotEquals), today)?;
    assert_eq!(names(&not_equals), vec!["A", "D"]);
    let after = query(&db, &by_year(CriterionModifier::GreaterThan), today)?;
    assert_eq!(names(&after), vec!["D"]);
    let before = query(&db, &by_year(CriterionModifier::LessThan), today)?;
    assert_eq!(names(&before), vec!["A"]);
    Ok(())
}

#[test]
fn age_filters_use_the_supplied_day() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = TestDb::new()?;
    born(&mut db, "A", ymd(1993, 6, 14))?;
    born(&mut db, "B", ymd(1993, 6, 15))?;
    born(&mut db, "C", ymd(1994, 6, 14))?;
    born(&mut db, "D", ymd(1994, 6, 15))?;
    let today = ymd(2024, 6, 15);

    let by_age = |modifier| PerformerFilter {
        age: Some(IntCriterion {
            value: 30,
            modifier,
        }),
        ..PerformerFilter::default()
    };

    let equals = query(&db, &by_age(CriterionModifier::Equals), today)?;
    assert_eq!(names(&equals), vec!["B", "C"]);
    let not_equals = query(&db, &by_age(CriterionModifier::NotEquals), today)?;
    assert_eq!(names(&not_equals), vec!["A", "D"]);
    let older = query(&db, &by_age(CriterionModifier::GreaterThan), today)?;
    assert_eq!(names(&older), vec!["A"]);
    let younger = query(&db, &by_age(CriterionModifier::LessThan), today)?;
    assert_eq!(names(&younger), vec!["D"]);
    Ok(())
}

#[test]
fn non_range_modifier_leaves_query_unfiltered() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = TestDb::new()?;
    born(&mut db, "A", ymd(1980, 1, 1))?;
    db.create_performer("B")?;

    let filter = PerformerFilter {
        birth_year: Some(IntCriterion {
            value: 1990,
            modifier: CriterionModifier::IsNull,
        }),
        ..PerformerFilter::default()
    };
    assert_eq!(names(&query(&db, &filter, ymd(2024, 1, 1))?), vec!["A", "B"]);
    assert_eq!(CriterionModifier::parse("BETWEEN"), None);
    Ok(())
}

#[test]
fn out_of_calendar_criteria_never_widen_the_query() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = TestDb::new()?;
    born(&mut db, "A", ymd(1990, 5, 1))?;
    db.create_performer("Undated")?;
    let today = ymd(2024, 6, 15);

    let criterion = |value, modifier| Some(IntCriterion { value, modifier });
    let year = |value, modifier| PerformerFilter {
        birth_year: criterion(value, modifier),
        ..PerformerFilter::default()
    };
    let age = |value, modifier| PerformerFilter {
        age: criterion(value, modifier),
        ..PerformerFilter::default()
    };

    assert!(query(&db, &year(300_000, CriterionModifier::Equals), today)?.is_empty());
    assert!(query(&db, &year(300_000, CriterionModifier::GreaterThan), today)?.is_empty());
    assert_eq!(
        names(&query(&db, &year(300_000, CriterionModifier::LessThan), today)?),
        vec!["A"]
    );
    assert!(query(&db, &age(500_000, CriterionModifier::Equals), today)?.is_empty());
    assert!(query(&db, &age(i32::MAX, CriterionModifier::Equals), today)?.is_empty());
    assert!(query(&db, &age(i32::MAX, CriterionModifier::GreaterThan), today)?.is_empty());
    assert_eq!(
        names(&query(&db, &age(i32::MAX, CriterionModifier::NotEquals), today)?),
        vec!["A"]
    );
    Ok(())
}

#[test]
fn query_pages_sorts_and_counts() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = TestDb::new()?;
    born(&mut db, "Cara", ymd(1985, 1, 1))?;
    born(&mut db, "Abby", ymd(1995, 1, 1))?;
    born(&mut db, "Bea", ymd(1990, 1, 1))?;
    born(&mut db, "Dana", ymd(1980, 1, 1))?;
    born(&mut db, "Eve", ymd(2000, 1, 1))?;
    let gone = born(&mut db, "Abe", ymd(1970, 1, 1))?;
    db.destroy(gone.id)?;

    let filter = PerformerFilter::default();
    let spec = |page, sort, direction| QuerySpec {
        page,
        per_page: Some(2),
        sort,
        direction,
    };

    let first = db
        .engine
        .query_performers(&filter, &spec(1, PerformerSort::Name, SortDirection::Asc))?;
    assert_eq!(names(&first.performers), vec!["Abby", "Bea"]);
    assert_eq!(first.count, 5);

    let last = db
        .engine
        .query_performers(&filter, &spec(3, PerformerSort::Name, SortDirection::Asc))?;
    assert_eq!(names(&last.performers), vec!["Eve"]);
    assert_eq!(last.count, 5);

    let page_zero = db
        .engine
        .query_performers(&filter, &spec(0, PerformerSort::Name, SortDirection::Asc))?;
    assert_eq!(page_zero, first);

    let beyond = db
        .engine
        .query_performers(&filter, &spec(9, PerformerSort::Name, SortDirection::Asc))?;
    assert!(beyond.performers.is_empty());
    assert_eq!(beyond.count, 5);

    let youngest = db
        .engine
        .query_performers(&filter, &spec(1, PerformerSort::Birthdate, SortDirection::Desc))?;
    assert_eq!(names(&youngest.performers), vec!["Eve", "Abby"]);

    assert_eq!(PerformerSort::parse("birthdate"), Some(PerformerSort::Birthdate));
    assert_eq!(PerformerSort::parse("height"), None);
    assert_eq!(SortDirection::parse("desc"), SortDirection::Desc);
    assert_eq!(SortDirection::parse("sideways"), SortDirection::Asc);
    Ok(())
}

#[test]
fn query_combines_name_country_and_excludes_deleted() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = TestDb::new()?;
    db.create_with(PerformerEdit {
        name: Some("Zoe Jane".into()),
        country: Some("US".into()),
        ..PerformerEdit::default()
    })?;
    db.create_with(PerformerEdit {
        name: Some("Anna Janeway".into()),
        country: Some("US".into()),
        ..PerformerEdit::default()
    })?;
    db.create_with(PerformerEdit {
        name: Some("Jane Doe".into()),
        country: Some("GB".into()),
        ..PerformerEdit::default()
    })?;
    let gone = db.create_with(PerformerEdit {
        name: Some("Janet".into()),
        country: Some("US".into()),
        ..PerformerEdit::default()
    })?;
    db.destroy(gone.id)?;

    let filter = PerformerFilter {
        name: Some("JANE".into()),
        country: Some("US".into()),
        ..PerformerFilter::default()
    };
    let found = db.engine.query_performers(&filter, &QuerySpec::default())?;
    assert_eq!(names(&found.performers), vec!["Anna Janeway", "Zoe Jane"]);
    assert_eq!(found.count, 2);

    let everyone = db
        .engine
        .query_performers(&PerformerFilter::default(), &QuerySpec::default())?;
    assert_eq!(everyone.count, 3);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn find_performers_output_matches_input_length(known in proptest::collection::vec(any::<bool>(), 0..8)) {
        let mut db = TestDb::new().unwrap();
        let mut ids = Vec::new();
        for (i, exists) in known.iter().enumerate() {
            if *exists {
                ids.push(db.create_performer(&format!("P{i}")).unwrap().id);
            } else {
                ids.push(PerformerId::new());
            }
        }
        let result = db.engine.find_performers(&ids).unwrap();
        prop_assert_eq!(result.len(), ids.len());
        for ((slot, id), exists) in result.iter().zip(&ids).zip(&known) {
            prop_assert_eq!(slot.is_some(), *exists);
            if let Some(p) = slot {
                prop_assert_eq!(p.id, *id);
            }
        }
    }
}
