//! 字段与模型翻译的集成测试

use rat_ormbridge::*;

fn field_options(field: &SourceField) -> FieldDefinition {
    translate_field(field)
        .expect("字段翻译不应失败")
        .expect("字段应有映射")
}

#[test]
fn test_scalar_kinds_map_with_options() {
    let char_field = field_options(&SourceField::char("title", 120).null().default("untitled"));
    assert_eq!(char_field.field_type, FieldType::String { max_length: 120 });
    assert!(char_field.null);
    assert_eq!(
        char_field.default.as_ref().map(DefaultValue::produce),
        Some(DataValue::from("untitled"))
    );

    let int_field = field_options(&SourceField::integer("votes").default(0));
    assert_eq!(int_field.field_type, FieldType::Integer);
    assert!(!int_field.null);

    let small = field_options(&SourceField::new("rank", SourceFieldKind::SmallInteger));
    assert_eq!(small.field_type, FieldType::Integer);

    let bool_field = field_options(&SourceField::boolean("active"));
    assert_eq!(bool_field.field_type, FieldType::Boolean);
    assert!(bool_field.default.is_none());

    let decimal = field_options(&SourceField::decimal("price", 8, 2));
    assert_eq!(
        decimal.field_type,
        FieldType::Decimal {
            max_digits: 8,
            decimal_places: 2
        }
    );

    assert!(!decimal.null);
    assert!(decimal.default.is_none());

    let nullable_decimal = field_options(&SourceField::decimal("discount", 5, 2).null().default(9.99));
    assert!(nullable_decimal.null);
    assert_eq!(
        nullable_decimal.default.as_ref().map(DefaultValue::produce),
        Some(DataValue::Float(9.99))
    );

    let ratio = field_options(&SourceField::float("ratio").null().default(0.5));
    assert_eq!(ratio.field_type, FieldType::Float);
    assert!(ratio.null);
    assert_eq!(ratio.default.as_ref().map(DefaultValue::produce), Some(DataValue::Float(0.5)));

    let body = field_options(&SourceField::text("body"));
    assert_eq!(body.field_type, FieldType::Text);
    assert!(!body.null);
    assert!(body.default.is_none());

    let created = field_options(&SourceField::datetime("created").auto_now_add());
    assert_eq!(created.field_type, FieldType::DateTime);
    assert!(created.auto_now_add);
    assert!(!created.auto_now);
    assert!(!created.null);

    let epoch = chrono::DateTime::from_timestamp(0, 0).unwrap();
    let published = field_options(&SourceField::datetime("published").null().default_with(move || DataValue::from(epoch)));
    assert_eq!(published.field_type, FieldType::DateTime);
    assert!(published.null);
    assert!(!published.auto_now && !published.auto_now_add);
    assert_eq!(
        published.default.as_ref().map(DefaultValue::produce),
        Some(DataValue::from(epoch))
    );

    let day = field_options(&SourceField::date("day").auto_now());
    assert_eq!(day.field_type, FieldType::Date);
    assert!(day.auto_now);

    let email = field_options(&SourceField::new(
        "email",
        SourceFieldKind::Email {
            max_length: Some(254),
        },
    ));
    assert_eq!(email.field_type, FieldType::String { max_length: 254 });

    let id = field_options(&SourceField::auto("id"));
    assert_eq!(id.field_type, FieldType::Integer);
    assert!(id.primary_key);
}

#[test]
fn test_unmapped_kinds_are_skipped_not_errors() {
    for kind in [
        SourceFieldKind::Uuid,
        SourceFieldKind::Json,
        SourceFieldKind::Time,
        SourceFieldKind::Binary,
        SourceFieldKind::Custom("ColorField".to_string()),
    ] {
        let result = translate_field(&SourceField::new("extra", kind));
        assert!(matches!(result, Ok(None)));
    }
}

#[test]
fn test_constructor_failure_propagates() {
    let unbounded = SourceField::new("name", SourceFieldKind::Char { max_length: None });
    assert!(matches!(
        translate_field(&unbounded),
        Err(BridgeError::ValidationError { .. })
    ));
}

#[test]
fn test_simple_model_translation() {
    let mut registry = ModelRegistry::new();
    let model = SourceModel::new("notes", "Note")
        .field(SourceField::char("text", 100))
        .field(SourceField::integer("count").default(0))
        .field(SourceField::new("uid", SourceFieldKind::Uuid));

    let meta = translate_model(&model, &mut registry).unwrap();

    assert_eq!(meta.name, "Note");
    assert_eq!(meta.module, DEFAULT_NAMESPACE);
    assert_eq!(meta.table, "notes_note");
    assert_eq!(meta.field("text").unwrap().field_type, FieldType::String { max_length: 100 });
    assert_eq!(meta.field("count").unwrap().field_type, FieldType::Integer);
    assert!(meta.field("uid").is_none());
    assert_eq!(meta.pk_name(), "id");
    assert!(registry.contains("Note"));
}

#[test]
fn test_foreign_key_default_related_name() {
    let mut registry = ModelRegistry::new();
    let choice = SourceModel::new("polls", "Choice")
        .field(SourceField::char("choice_text", 200))
        .field(SourceField::foreign_key(
            "question",
            RelationTarget::Model("Question".to_string()),
        ));

    let meta = translate_model(&choice, &mut registry).unwrap();

    assert_eq!(
        meta.field("question").unwrap().field_type,
        FieldType::ForeignKey {
            reference: "models.Question".to_string(),
            related_name: "choice_set".to_string(),
        }
    );
}

#[test]
fn test_many_to_many_default_related_name() {
    let mut registry = ModelRegistry::new();
    let post = SourceModel::new("blog", "Post").field(SourceField::many_to_many(
        "tags",
        RelationTarget::Reference("blog.Tag".to_string()),
    ));
    assert_eq!(post.many_to_many.len(), 1);

    let meta = translate_model(&post, &mut registry).unwrap();

    assert_eq!(
        meta.field("tags").unwrap().field_type,
        FieldType::ManyToMany {
            reference: "models.Tag".to_string(),
            related_name: "post_set".to_string(),
            through: None,
        }
    );
}

#[test]
fn test_explicit_related_name_wins() {
    let mut registry = ModelRegistry::new();
    let pet = SourceModel::new("zoo", "Pet").field(
        SourceField::foreign_key("owner", RelationTarget::Model("Person".to_string())).related_name("pets"),
    );

    let meta = translate_model(&pet, &mut registry).unwrap();

    assert_eq!(meta.field("owner").unwrap().field_type.related_name(), Some("pets"));
}

#[test]
fn test_retranslation_overwrites_entry() {
    let mut registry = ModelRegistry::new();
    let first = SourceModel::new("notes", "Note").field(SourceField::char("text", 50));
    let second = SourceModel::new("notes", "Note").field(SourceField::text("body"));

    translate_model(&first, &mut registry).unwrap();
    translate_model(&second, &mut registry).unwrap();

    assert_eq!(registry.len(), 1);
    let meta = registry.get("Note").unwrap();
    assert!(meta.field("text").is_none());
    assert_eq!(meta.field("body").unwrap().field_type, FieldType::Text);
}

#[test]
fn test_batch_skips_failed_models() {
    let mut catalog = ModelCatalog::new();
    catalog.register(SourceModel::new("polls", "Question").field(SourceField::char("text", 200)));
    catalog.register(
        SourceModel::new("polls", "Broken").field(SourceField::foreign_key("target", RelationTarget::Unresolved)),
    );

    let mut registry = ModelRegistry::new();
    let report = translate_all(&catalog, &mut registry);

    assert!(report.is_translated("Question"));
    assert!(!report.is_translated("Broken"));
    assert!(report.skipped_reason("Broken").is_some());
    assert!(!registry.contains("Broken"));
    assert_eq!(report.translated().collect::<Vec<_>>(), vec!["Question"]);
}

#[test]
fn test_schema_excludes_models_with_unknown_targets() {
    let mut registry = ModelRegistry::new();
    let question = SourceModel::new("polls", "Question").field(SourceField::char("text", 200));
    let choice = SourceModel::new("polls", "Choice")
        .field(SourceField::foreign_key("question", RelationTarget::Model("Question".to_string())));
    let vote = SourceModel::new("polls", "Vote")
        .field(SourceField::foreign_key("ballot", RelationTarget::Model("Ballot".to_string())));
    for model in [&question, &choice, &vote] {
        translate_model(model, &mut registry).unwrap();
    }

    let (schema, excluded) = Schema::build(&registry);

    assert!(schema.contains("Question"));
    assert!(schema.contains("Choice"));
    assert!(!schema.contains("Vote"));
    assert_eq!(excluded.len(), 1);
    assert_eq!(excluded[0].name(), "Vote");
    assert!(schema.reverse_relation("Question", "choice_set").is_some());
}
