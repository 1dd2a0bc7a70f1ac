use common::types::{Id, UserId};
use wizard::{
    Answer, ComplaintTarget, Event, FieldDefinition, FieldType, NewBan, NewComplaint, NewService, Outcome,
    Policy, PriceTier, Record, RecordStore, ServicePatch, ServiceStatus, Step, StoreError, UserPatch, Wizard,
    WizardKind,
};

use super::*;

const ADMIN: UserId = UserId(1);
const SELLER: UserId = UserId(2);

async fn prepare() -> Result<DB> {
    common::init_logger();

    const DIR: &str = "target/test-db";
    const REL_PATH: &str = "../..";
    std::fs::create_dir_all(format!("{REL_PATH}/{DIR}")).unwrap();
    let path_fmt = |id| format!("{REL_PATH}/{DIR}/{id}.db");

    // in hope that no single test can call this at the same time
    let mut id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();

    let mut file = path_fmt(id);
    while std::fs::exists(&file).unwrap() {
        id += 1;
        file = path_fmt(id);
    }

    log::debug!("using db at {DIR}/{id}.db");
    DB::init(&file).await
}

fn select_field(name: &str, options: &[&str]) -> FieldDefinition {
    FieldDefinition::builder()
        .name(name)
        .label(name.to_uppercase())
        .field_type(FieldType::Select)
        .required(true)
        .options(options.iter().map(ToString::to_string).collect())
        .build()
}

fn new_service(service_type_id: Id) -> NewService {
    NewService {
        owner: SELLER,
        service_type_id,
        title: "Репетитор".to_string(),
        price: 1500.0,
        city: "Москва".to_string(),
        district: "Центральный".to_string(),
        street: "Тверская".to_string(),
        house: None,
        number_phone: "+79991234567".to_string(),
        photo: "photo-id".to_string(),
        custom_fields: [("subject".to_string(), Answer::from("math"))].into(),
    }
}

#[tokio::test]
async fn test_service_type_name_conflict() -> Result<()> {
    let db = prepare().await?;

    let id = db.add_service_type("Репетитор", PriceTier::Thousands, ADMIN).await?;

    // lowercased in rust, so non-ascii names collide too
    let err = db
        .create_service_type("РЕПЕТИТОР", PriceTier::TensOfThousands, ADMIN)
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::Conflict);

    let found = db.select_service_type_by_name("репетитор").await?.unwrap();
    assert_eq!(found.id, id);
    assert_eq!(found.name, "Репетитор");
    assert_eq!(found.created_by, ADMIN);

    assert!(db.save_service_type_inactive(id).await?);
    assert!(db.select_service_types().await?.is_empty());
    // still reserves the name
    assert!(db.select_service_type_by_name("Репетитор").await?.is_some());
    assert!(!db.save_service_type_inactive(id + 1).await?);

    assert_eq!(
        RecordStore::service_type(&db, id + 1).await.unwrap_err(),
        StoreError::NotFound
    );
    Ok(())
}

#[tokio::test]
async fn test_fields_order() -> Result<()> {
    let db = prepare().await?;
    let id = db.add_service_type("Грузчик", PriceTier::Thousands, ADMIN).await?;

    let first = select_field("experience", &["1-3 года", "3-5 лет"]);
    let second = FieldDefinition::builder()
        .name("skills")
        .label("Навыки")
        .field_type(FieldType::Text)
        .description("Чем занимаетесь")
        .build();

    assert!(db.add_field(id, &first, 1).await?);
    assert!(db.add_field(id, &second, 2).await?);
    assert!(!db.add_field(id + 1, &second, 1).await?);

    assert_eq!(db.select_fields(id).await?, vec![first.clone(), second.clone()]);

    // same name in one type
    let err = db.append_field(id, &first, 3).await.unwrap_err();
    assert_eq!(err, StoreError::Conflict);

    assert!(db.delete_last_field(id).await?);
    assert_eq!(db.select_fields(id).await?, vec![first]);
    assert!(db.delete_last_field(id).await?);
    assert!(!db.delete_last_field(id).await?);
    Ok(())
}

#[tokio::test]
async fn test_service_patch() -> Result<()> {
    let db = prepare().await?;
    let type_id = db.add_service_type("Репетитор", PriceTier::Thousands, ADMIN).await?;

    let service_id = db.add_service(&new_service(type_id)).await?;
    let user = db.select_user(SELLER).await?.unwrap();
    assert!(user.is_seller());

    let table = [
        ServicePatch::Price(2000.0),
        ServicePatch::House(Some("12".to_string())),
        ServicePatch::Custom {
            name: "level".to_string(),
            value: Some(Answer::Int(3)),
        },
        ServicePatch::Custom {
            name: "subject".to_string(),
            value: None,
        },
        ServicePatch::Status(ServiceStatus::Blocked),
    ];
    for (i, patch) in table.iter().enumerate() {
        assert!(db.save_service(service_id, patch).await?, "test table[{i}]");
    }

    let service = db.select_service(service_id).await?.unwrap();
    assert_eq!(service.price, 2000.0);
    assert_eq!(service.house.as_deref(), Some("12"));
    assert_eq!(service.custom_fields, [("level".to_string(), Answer::Int(3))].into());
    assert_eq!(service.status, ServiceStatus::Blocked);

    assert!(db.select_services(type_id).await?.is_empty());
    assert_eq!(db.select_user_services(SELLER).await?.len(), 1);
    assert!(!db.save_service(service_id + 1, &ServicePatch::Price(1.0)).await?);
    Ok(())
}

#[tokio::test]
async fn test_complaints_and_bans() -> Result<()> {
    let db = prepare().await?;
    let target = ComplaintTarget::User(SELLER);

    let complaint_id = db
        .add_complaint(&NewComplaint {
            target,
            creator: UserId(3),
            text: "не пришёл на встречу".to_string(),
        })
        .await?;
    let complaint = db.select_complaint(complaint_id).await?.unwrap();
    assert_eq!(complaint.target, target);
    assert_eq!(db.select_complaints().await?.len(), 1);

    assert!(db.delete_complaint(complaint_id).await?);
    assert!(!db.delete_complaint(complaint_id).await?);

    assert_eq!(db.select_active_ban(target).await?, None);
    let ban = NewBan {
        target,
        admin: Some(ADMIN),
        hours: 24,
        permanent: false,
        reason: "спам".to_string(),
    };
    let ban_id = db.add_ban(&ban).await?;

    let active = db.select_active_ban(target).await?.unwrap();
    assert_eq!(active.id, ban_id);
    assert_eq!(active.admin, Some(ADMIN));
    assert!(db.is_user_banned(SELLER).await?);
    // other targets are not affected
    assert_eq!(db.select_active_ban(ComplaintTarget::Service(1)).await?, None);

    let expired_at = active.created_at + 24 * 3600;
    assert_eq!(db.select_active_ban_at(target, expired_at).await?, None);

    db.add_ban(&NewBan {
        admin: None,
        permanent: true,
        hours: 0,
        ..ban
    })
    .await?;
    let active = db.select_active_ban_at(target, expired_at).await?.unwrap();
    assert!(active.permanent);
    assert_eq!(active.admin, None);
    Ok(())
}

#[tokio::test]
async fn test_user_profile() -> Result<()> {
    let db = prepare().await?;

    assert!(!db.save_user_profile(SELLER, &UserPatch::Phone("+70000000000".to_string())).await?);

    let user = models::User::builder()
        .user_id(SELLER.into())
        .username("seller".to_string())
        .name("Иван".to_string())
        .build();
    db.save_user(&user).await?;
    assert!(db.save_user_profile(SELLER, &UserPatch::Name("Пётр".to_string())).await?);
    assert!(db.save_user_profile(SELLER, &UserPatch::Phone("+70000000000".to_string())).await?);

    // saved again on /start, profile name is kept
    db.save_user(&user).await?;
    let saved = db.select_user(SELLER).await?.unwrap();
    assert_eq!(saved.name(), Some("Пётр"));
    assert_eq!(saved.number_phone(), Some("+70000000000"));

    let stats = db.load_stats().await?;
    assert_eq!(stats.users, 1);
    assert_eq!(stats.sellers, 0);
    Ok(())
}

#[tokio::test]
async fn test_wizard_adds_field() -> anyhow::Result<()> {
    let db = prepare().await?;
    let type_id = db.add_service_type("Репетитор", PriceTier::Thousands, ADMIN).await?;
    let w = Wizard::new(db, Policy::default(), None);

    w.start_wizard(WizardKind::AddField { service_type_id: type_id }, ADMIN)
        .await?;
    let steps = [
        Event::text(ADMIN, "experience"),
        Event::button(ADMIN, "select"),
        Event::text(ADMIN, "EXPERIENCE"),
        Event::text(ADMIN, ""),
        Event::button(ADMIN, "yes"),
        Event::text(ADMIN, "1-3 года, 3-5 лет"),
    ];
    for (i, event) in steps.into_iter().enumerate() {
        let outcome = w.handle_reply(event).await?;
        assert!(matches!(outcome, Outcome::Prompt(_)), "test table[{i}]: {outcome:?}");
    }
    assert_eq!(w.prompt(ADMIN).await?.step, Step::Confirm);

    let Outcome::Committed { record, next } = w.handle_reply(Event::button(ADMIN, "confirm")).await? else {
        panic!("expected commit");
    };
    assert_eq!(
        record,
        Record::Field {
            service_type_id: type_id,
            order_position: 1
        }
    );
    assert_eq!(next.map(|p| p.step), Some(Step::Management));
    assert_eq!(
        w.store().select_fields(type_id).await?,
        vec![select_field("experience", &["1-3 года", "3-5 лет"])]
    );
    Ok(())
}
