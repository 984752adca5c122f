use super::common::*;
use crate::workflows::applications::domain::{ApplicationId, PaymentStatus};
use crate::workflows::applications::service::{PaymentRequest, WorkflowError};

fn payment_request(application_id: ApplicationId) -> PaymentRequest {
    PaymentRequest {
        application_id,
        amount_cents: 100_000,
        payment_method: "card".to_string(),
        transaction_reference: Some("TXN-889900".to_string()),
    }
}

#[test]
fn payment_records_as_completed() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);

    let payment = fixture
        .service
        .create_payment(fixture.citizen.id, payment_request(application.id))
        .expect("payment recorded");

    assert_eq!(payment.application_id, application.id);
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.amount_cents, 100_000);
    assert_eq!(payment.transaction_reference.as_deref(), Some("TXN-889900"));
}

#[test]
fn payment_against_foreign_application_reads_as_missing() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);

    match fixture
        .service
        .create_payment(fixture.other_citizen.id, payment_request(application.id))
    {
        Err(WorkflowError::NotFound("application")) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn payment_listing_applies_first_row_ownership_check() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);
    fixture
        .service
        .create_payment(fixture.citizen.id, payment_request(application.id))
        .expect("payment recorded");

    let mine = fixture
        .service
        .list_payments(fixture.citizen.id, application.id)
        .expect("owner lists payments");
    assert_eq!(mine.len(), 1);

    match fixture
        .service
        .list_payments(fixture.other_citizen.id, application.id)
    {
        Err(WorkflowError::Forbidden) => {}
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[test]
fn empty_payment_listing_passes_for_anyone() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);

    let payments = fixture
        .service
        .list_payments(fixture.other_citizen.id, application.id)
        .expect("empty listing passes");
    assert!(payments.is_empty());
}

#[test]
fn payment_does_not_touch_the_review_track() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);

    fixture
        .service
        .create_payment(fixture.citizen.id, payment_request(application.id))
        .expect("payment recorded");

    let stored = fixture
        .service
        .get_application(fixture.citizen.id, application.id)
        .expect("application readable");
    assert_eq!(stored.status_id, application.status_id);
}
