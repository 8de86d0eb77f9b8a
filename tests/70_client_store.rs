mod common;

use anyhow::Result;

use melody_studio_api::client::{ApiClient, ClientError, ListStore};
use melody_studio_api::records::{AdminEntry, Appointment, AppointmentPatch, Incident, NewAppointment, NewIncident};
use melody_studio_api::services::SignupRequest;
use melody_studio_api::types::Role;

fn signup(email: &str) -> SignupRequest {
    SignupRequest {
        email: email.to_string(),
        password: "secret123".to_string(),
        ..Default::default()
    }
}

fn new_appointment(title: &str) -> NewAppointment {
    NewAppointment { title: title.to_string(), ..Default::default() }
}

async fn signed_in(server: &common::TestServer, role: Role, email: &str) -> Result<ApiClient> {
    let mut client = ApiClient::new(&server.base_url)?;
    client.signup(role, &signup(email)).await?;
    Ok(client)
}

#[tokio::test]
async fn client_auth_round_trip() -> Result<()> {
    let server = common::spawn_server().await?;
    let mut client = ApiClient::new(&server.base_url)?;

    let created = client.signup(Role::Client, &signup("ana@melody.test")).await?;
    assert_eq!(created.role, Role::Client);
    assert!(client.token().is_some());

    let me = client.whoami().await?;
    assert_eq!(me.uid, created.uid);

    let session = client.login("ana@melody.test", "secret123").await?;
    assert_eq!(session.display_name, "ana");

    let stale = client.clone();
    client.signout().await?;
    assert!(client.token().is_none());

    match stale.whoami().await {
        Err(ClientError::Api { status, code, .. }) => {
            assert_eq!(status, 401);
            assert_eq!(code, "UNAUTHORIZED");
        }
        other => panic!("expected 401, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn store_pages_forward_and_appends() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = signed_in(&server, Role::Client, "ana@melody.test").await?;
    for title in ["Alpha", "Beta", "Gamma"] {
        let _: Appointment = client.create("/appointments", &new_appointment(title)).await?;
    }

    let mut store = ListStore::<Appointment>::new(client, "/appointments");
    store.fetch_first_page(2).await?;
    let titles: Vec<_> = store.items.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Gamma", "Beta"]);
    assert!(store.pagination.has_next_page);
    assert_eq!(store.pagination.total_items, 3);
    assert_eq!(store.pagination.total_pages, 2);
    assert!(!store.loading);

    assert!(store.fetch_next_page(2).await?);
    let titles: Vec<_> = store.items.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Gamma", "Beta", "Alpha"]);
    assert!(!store.pagination.has_next_page);

    // Exhausted: no request, nothing changes
    assert!(!store.fetch_next_page(2).await?);
    assert_eq!(store.items.len(), 3);
    Ok(())
}

#[tokio::test]
async fn store_search_query_narrows_the_list() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = signed_in(&server, Role::Client, "ana@melody.test").await?;
    for title in ["Bass", "Guitar b", "Guitar a"] {
        let _: Appointment = client.create("/appointments", &new_appointment(title)).await?;
    }

    let mut store = ListStore::<Appointment>::new(client, "/appointments");
    store.set_search_query("Guitar");
    store.fetch_first_page(1).await?;
    assert!(store.fetch_next_page(1).await?);
    let titles: Vec<_> = store.items.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Guitar a", "Guitar b"]);
    assert!(!store.pagination.has_next_page);
    Ok(())
}

#[tokio::test]
async fn store_mutations_track_the_server() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = signed_in(&server, Role::Client, "ana@melody.test").await?;

    let mut store = ListStore::<Incident>::new(client, "/incidencias");
    store.fetch_first_page(3).await?;
    assert!(store.items.is_empty());

    for title in ["Broken amp", "No wifi"] {
        let input = NewIncident { title: title.to_string(), description: String::new() };
        store.create(&input).await?;
    }
    let titles: Vec<_> = store.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["No wifi", "Broken amp"]);
    assert_eq!(store.pagination.total_items, 2);

    let id = store.items[1].id.clone();
    store
        .update(&id, &melody_studio_api::records::IncidentPatch { title: None, description: Some("Fixed".into()) })
        .await?;
    assert_eq!(store.items[1].description, "Fixed");

    store.delete(&id).await?;
    assert_eq!(store.items.len(), 1);
    assert_eq!(store.pagination.total_items, 1);

    // The server agrees
    store.fetch_first_page(3).await?;
    assert_eq!(store.items.len(), 1);
    assert_eq!(store.pagination.total_items, 1);
    Ok(())
}

#[tokio::test]
async fn refused_delete_restores_the_item() -> Result<()> {
    let server = common::spawn_server().await?;
    let owner = signed_in(&server, Role::Client, "owner@melody.test").await?;
    let intruder = signed_in(&server, Role::Client, "intruder@melody.test").await?;

    let mut mine = ListStore::<Appointment>::new(owner, "/appointments");
    for title in ["First", "Second", "Third"] {
        mine.create(&new_appointment(title)).await?;
    }
    let target = mine.items[1].clone();

    // The intruder's store holds a copy of someone else's record
    let mut theirs = ListStore::<Appointment>::new(intruder, "/appointments");
    theirs.items = mine.items.clone();

    match theirs.delete(&target.id).await {
        Err(ClientError::Api { status, .. }) => assert_eq!(status, 403),
        other => panic!("expected 403, got {other:?}"),
    }
    assert_eq!(theirs.items, mine.items);
    assert_eq!(theirs.items[1], target);
    assert!(theirs.error.is_some());

    // Update failures surface the same way and leave the copy untouched
    let patch = AppointmentPatch { title: Some("Hijacked".into()), ..Default::default() };
    assert!(theirs.update(&target.id, &patch).await.is_err());
    assert_eq!(theirs.items[1].title, "Second");
    Ok(())
}

#[tokio::test]
async fn admin_store_reads_labelled_entries() -> Result<()> {
    let server = common::spawn_server().await?;
    let ana = signed_in(&server, Role::Client, "ana@melody.test").await?;
    let admin = signed_in(&server, Role::Admin, "root@melody.test").await?;
    let _: Appointment = ana.create("/appointments", &new_appointment("Ana lesson")).await?;

    let mut store = ListStore::<AdminEntry<Appointment>>::new(admin, "/admin/appointments");
    store.fetch_first_page(10).await?;
    assert_eq!(store.items.len(), 1);
    assert_eq!(store.items[0].record.title, "Ana lesson");
    assert_eq!(store.items[0].user_name, "ana@melody.test");

    let id = store.items[0].record.id.clone();
    store.delete(&id).await?;
    assert!(store.items.is_empty());
    Ok(())
}
