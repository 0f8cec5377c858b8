use crate::{
    models::{PaymentOutcome, ProcessPaymentRequest},
    repository::RepositoryState,
};

/// process_payment
///
/// The core business transaction: converts a completed payment into a payment
/// record, clears the purchased cart items, and decrements the available seats of
/// every purchased class.
///
/// The three writes are sequential, independent document-store operations — there
/// is no cross-collection transaction, no rollback, and no idempotency key. A
/// failure after step 1 leaves the payment recorded without the cart cleanup or
/// seat decrement, and replaying the same payload decrements the seats again
/// (seat counts can go negative; there is no floor check). Two concurrent
/// purchases of a class's last seat can both succeed. These are the documented
/// semantics of the purchase flow, preserved as-is; the integration tests pin
/// them down.
///
/// Enrollment records are NOT created here: they are written through their own
/// endpoint after the client confirms the purchase, decoupled from this sequence.
pub async fn process_payment(
    repo: &RepositoryState,
    req: ProcessPaymentRequest,
) -> PaymentOutcome {
    let cart_items = req.cart_items.clone();
    let class_items = req.class_items.clone();

    // Step 1: record the payment unconditionally. No seat or cart validation first.
    let payment = repo.insert_payment(req).await;

    // Step 2: clear the purchased cart items.
    let removed_cart_items = repo.delete_cart_items(&cart_items).await;

    // Step 3: one seat per purchased class.
    let updated_classes = repo.decrement_seats(&class_items).await;

    tracing::info!(
        payment_id = %payment.id,
        removed_cart_items,
        updated_classes,
        "payment processed"
    );

    PaymentOutcome {
        payment,
        removed_cart_items,
        updated_classes,
    }
}
