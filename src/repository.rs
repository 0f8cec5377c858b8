use crate::models::{
    AddCartItemRequest, CartItem, ClassListing, CreateClassRequest, CreateEnrollmentRequest,
    Enrollment, Payment, ProcessPaymentRequest, RegisterUserRequest, UpdateClassRequest, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations against the five
/// document collections (users, classes, carts, payments, enrollments). This is the
/// core of the Repository Abstraction pattern, allowing the handlers to interact
/// with the data layer without knowing the specific implementation (Postgres,
/// in-memory, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task
/// boundaries.
///
/// There are no cross-collection transactions anywhere on this contract: the
/// enrollment workflow issues its three writes as independent calls, by design.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn list_users(&self) -> Vec<User>;
    async fn get_user_by_email(&self, email: &str) -> Option<User>;
    async fn create_user(&self, req: RegisterUserRequest) -> User;
    // Role promotion. Returns true if a row was updated.
    async fn set_user_role(&self, id: Uuid, role: &str) -> bool;

    // --- Classes ---
    async fn list_classes(&self) -> Vec<ClassListing>;
    async fn list_approved_classes(&self) -> Vec<ClassListing>;
    async fn list_classes_by_instructor(&self, email: &str) -> Vec<ClassListing>;
    async fn get_class(&self, id: Uuid) -> Option<ClassListing>;
    // Inserts with status forced to "pending".
    async fn create_class(&self, req: CreateClassRequest) -> ClassListing;
    // Full-field replacement; unconditionally resets status to "pending".
    async fn replace_class(&self, id: Uuid, req: UpdateClassRequest) -> Option<ClassListing>;
    // Moderation: the caller validates the status value before this is reached.
    async fn set_class_status(&self, id: Uuid, status: &str) -> Option<ClassListing>;
    async fn set_class_feedback(&self, id: Uuid, feedback: &str) -> bool;
    // Decrements available_seats by 1 for every listed class. No floor check:
    // a seat count can go negative, matching the lenient purchase semantics.
    async fn decrement_seats(&self, class_ids: &[Uuid]) -> u64;

    // --- Carts ---
    async fn get_cart_items(&self, email: &str) -> Vec<CartItem>;
    async fn add_cart_item(&self, req: AddCartItemRequest) -> CartItem;
    async fn remove_cart_item(&self, id: Uuid) -> bool;
    // Bulk delete by id, used by the enrollment workflow after a purchase.
    async fn delete_cart_items(&self, ids: &[Uuid]) -> u64;

    // --- Payments ---
    async fn insert_payment(&self, req: ProcessPaymentRequest) -> Payment;
    async fn get_payments(&self, email: &str) -> Vec<Payment>;

    // --- Enrollments ---
    async fn insert_enrollment(&self, req: CreateEnrollmentRequest) -> Enrollment;
    async fn get_enrollments(&self, student_email: &str) -> Vec<Enrollment>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// All queries are runtime-checked (`sqlx::query_as::<_, T>` + `bind`) so the crate
/// builds without a live database connection.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_users(&self) -> Vec<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, name, photo_url, role FROM users ORDER BY email",
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_users error: {:?}", e);
            vec![]
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Option<User> {
        sqlx::query_as::<_, User>("SELECT id, email, name, photo_url, role FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user_by_email error: {:?}", e);
                None
            })
    }

    /// create_user
    ///
    /// Inserts a new user record. The duplicate-email check happens in the handler
    /// before this is called; the unique index on `email` is the backstop.
    async fn create_user(&self, req: RegisterUserRequest) -> User {
        let new_id = Uuid::new_v4();
        let role = req.role.unwrap_or_else(|| "student".to_string());
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, email, name, photo_url, role)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, email, name, photo_url, role"#,
        )
        .bind(new_id)
        .bind(req.email)
        .bind(req.name)
        .bind(req.photo_url)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to insert user")
    }

    async fn set_user_role(&self, id: Uuid, role: &str) -> bool {
        match sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role)
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("set_user_role error: {:?}", e);
                false
            }
        }
    }

    async fn list_classes(&self) -> Vec<ClassListing> {
        sqlx::query_as::<_, ClassListing>(
            r#"SELECT id, name, image, instructor_name, instructor_email, price,
                      available_seats, status, feedback, created_at
               FROM classes ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_classes error: {:?}", e);
            vec![]
        })
    }

    /// list_approved_classes
    ///
    /// The public catalog: only listings an admin has approved.
    async fn list_approved_classes(&self) -> Vec<ClassListing> {
        sqlx::query_as::<_, ClassListing>(
            r#"SELECT id, name, image, instructor_name, instructor_email, price,
                      available_seats, status, feedback, created_at
               FROM classes WHERE status = 'approved' ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_approved_classes error: {:?}", e);
            vec![]
        })
    }

    async fn list_classes_by_instructor(&self, email: &str) -> Vec<ClassListing> {
        sqlx::query_as::<_, ClassListing>(
            r#"SELECT id, name, image, instructor_name, instructor_email, price,
                      available_seats, status, feedback, created_at
               FROM classes WHERE instructor_email = $1 ORDER BY created_at DESC"#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_classes_by_instructor error: {:?}", e);
            vec![]
        })
    }

    async fn get_class(&self, id: Uuid) -> Option<ClassListing> {
        sqlx::query_as::<_, ClassListing>(
            r#"SELECT id, name, image, instructor_name, instructor_email, price,
                      available_seats, status, feedback, created_at
               FROM classes WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_class error: {:?}", e);
            None
        })
    }

    /// create_class
    ///
    /// Inserts a new listing. All new listings start as `status = 'pending'`,
    /// requiring administrative approval before they appear in the public catalog.
    async fn create_class(&self, req: CreateClassRequest) -> ClassListing {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, ClassListing>(
            r#"INSERT INTO classes
                   (id, name, image, instructor_name, instructor_email, price,
                    available_seats, status, feedback, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', NULL, NOW())
               RETURNING id, name, image, instructor_name, instructor_email, price,
                         available_seats, status, feedback, created_at"#,
        )
        .bind(new_id)
        .bind(req.name)
        .bind(req.image)
        .bind(req.instructor_name)
        .bind(req.instructor_email)
        .bind(req.price)
        .bind(req.available_seats)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to insert class")
    }

    /// replace_class
    ///
    /// Full-document replacement of the editable fields. The status reset to
    /// 'pending' is unconditional: every owner edit re-enters moderation.
    async fn replace_class(&self, id: Uuid, req: UpdateClassRequest) -> Option<ClassListing> {
        sqlx::query_as::<_, ClassListing>(
            r#"UPDATE classes
               SET name = $2, image = $3, price = $4, available_seats = $5,
                   status = 'pending'
               WHERE id = $1
               RETURNING id, name, image, instructor_name, instructor_email, price,
                         available_seats, status, feedback, created_at"#,
        )
        .bind(id)
        .bind(req.name)
        .bind(req.image)
        .bind(req.price)
        .bind(req.available_seats)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("replace_class error: {:?}", e);
            None
        })
    }

    async fn set_class_status(&self, id: Uuid, status: &str) -> Option<ClassListing> {
        sqlx::query_as::<_, ClassListing>(
            r#"UPDATE classes SET status = $2 WHERE id = $1
               RETURNING id, name, image, instructor_name, instructor_email, price,
                         available_seats, status, feedback, created_at"#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("set_class_status error: {:?}", e);
            None
        })
    }

    async fn set_class_feedback(&self, id: Uuid, feedback: &str) -> bool {
        match sqlx::query("UPDATE classes SET feedback = $2 WHERE id = $1")
            .bind(id)
            .bind(feedback)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("set_class_feedback error: {:?}", e);
                false
            }
        }
    }

    /// decrement_seats
    ///
    /// One UPDATE covering every purchased class. Deliberately no
    /// `available_seats > 0` guard; see the enrollment workflow notes.
    async fn decrement_seats(&self, class_ids: &[Uuid]) -> u64 {
        match sqlx::query("UPDATE classes SET available_seats = available_seats - 1 WHERE id = ANY($1)")
            .bind(class_ids)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected(),
            Err(e) => {
                tracing::error!("decrement_seats error: {:?}", e);
                0
            }
        }
    }

    async fn get_cart_items(&self, email: &str) -> Vec<CartItem> {
        sqlx::query_as::<_, CartItem>(
            "SELECT id, email, class_id, class_name, price FROM carts WHERE email = $1",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_cart_items error: {:?}", e);
            vec![]
        })
    }

    async fn add_cart_item(&self, req: AddCartItemRequest) -> CartItem {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, CartItem>(
            r#"INSERT INTO carts (id, email, class_id, class_name, price)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, email, class_id, class_name, price"#,
        )
        .bind(new_id)
        .bind(req.email)
        .bind(req.class_id)
        .bind(req.class_name)
        .bind(req.price)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to insert cart item")
    }

    async fn remove_cart_item(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("remove_cart_item error: {:?}", e);
                false
            }
        }
    }

    async fn delete_cart_items(&self, ids: &[Uuid]) -> u64 {
        match sqlx::query("DELETE FROM carts WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected(),
            Err(e) => {
                tracing::error!("delete_cart_items error: {:?}", e);
                0
            }
        }
    }

    async fn insert_payment(&self, req: ProcessPaymentRequest) -> Payment {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, Payment>(
            r#"INSERT INTO payments
                   (id, email, transaction_id, amount, cart_items, class_items, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, NOW())
               RETURNING id, email, transaction_id, amount, cart_items, class_items, created_at"#,
        )
        .bind(new_id)
        .bind(req.email)
        .bind(req.transaction_id)
        .bind(req.amount)
        .bind(req.cart_items)
        .bind(req.class_items)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to insert payment")
    }

    async fn get_payments(&self, email: &str) -> Vec<Payment> {
        sqlx::query_as::<_, Payment>(
            r#"SELECT id, email, transaction_id, amount, cart_items, class_items, created_at
               FROM payments WHERE email = $1 ORDER BY created_at DESC"#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_payments error: {:?}", e);
            vec![]
        })
    }

    async fn insert_enrollment(&self, req: CreateEnrollmentRequest) -> Enrollment {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, Enrollment>(
            r#"INSERT INTO enrollments (id, student_email, class_id, class_name, created_at)
               VALUES ($1, $2, $3, $4, NOW())
               RETURNING id, student_email, class_id, class_name, created_at"#,
        )
        .bind(new_id)
        .bind(req.student_email)
        .bind(req.class_id)
        .bind(req.class_name)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to insert enrollment")
    }

    async fn get_enrollments(&self, student_email: &str) -> Vec<Enrollment> {
        sqlx::query_as::<_, Enrollment>(
            r#"SELECT id, student_email, class_id, class_name, created_at
               FROM enrollments WHERE student_email = $1 ORDER BY created_at DESC"#,
        )
        .bind(student_email)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_enrollments error: {:?}", e);
            vec![]
        })
    }
}

// --- In-Memory Implementation (For Tests) ---

#[derive(Default)]
struct MemoryStore {
    users: Vec<User>,
    classes: Vec<ClassListing>,
    carts: Vec<CartItem>,
    payments: Vec<Payment>,
    enrollments: Vec<Enrollment>,
}

/// MemoryRepository
///
/// A complete in-process implementation of `Repository` used by the integration
/// tests, mirroring the Postgres semantics (including the unconditional seat
/// decrement) without requiring a database. Same isolation move as the
/// `MockPaymentGateway` for the payment provider.
#[derive(Default)]
pub struct MemoryRepository {
    store: Mutex<MemoryStore>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_users(&self) -> Vec<User> {
        self.store.lock().unwrap().users.clone()
    }

    async fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.store
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    async fn create_user(&self, req: RegisterUserRequest) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: req.email,
            name: req.name,
            photo_url: req.photo_url,
            role: req.role.unwrap_or_else(|| "student".to_string()),
        };
        self.store.lock().unwrap().users.push(user.clone());
        user
    }

    async fn set_user_role(&self, id: Uuid, role: &str) -> bool {
        let mut store = self.store.lock().unwrap();
        match store.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.role = role.to_string();
                true
            }
            None => false,
        }
    }

    async fn list_classes(&self) -> Vec<ClassListing> {
        self.store.lock().unwrap().classes.clone()
    }

    async fn list_approved_classes(&self) -> Vec<ClassListing> {
        self.store
            .lock()
            .unwrap()
            .classes
            .iter()
            .filter(|c| c.status == "approved")
            .cloned()
            .collect()
    }

    async fn list_classes_by_instructor(&self, email: &str) -> Vec<ClassListing> {
        self.store
            .lock()
            .unwrap()
            .classes
            .iter()
            .filter(|c| c.instructor_email == email)
            .cloned()
            .collect()
    }

    async fn get_class(&self, id: Uuid) -> Option<ClassListing> {
        self.store
            .lock()
            .unwrap()
            .classes
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    async fn create_class(&self, req: CreateClassRequest) -> ClassListing {
        let class = ClassListing {
            id: Uuid::new_v4(),
            name: req.name,
            image: req.image,
            instructor_name: req.instructor_name,
            instructor_email: req.instructor_email,
            price: req.price,
            available_seats: req.available_seats,
            status: "pending".to_string(),
            feedback: None,
            created_at: chrono::Utc::now(),
        };
        self.store.lock().unwrap().classes.push(class.clone());
        class
    }

    async fn replace_class(&self, id: Uuid, req: UpdateClassRequest) -> Option<ClassListing> {
        let mut store = self.store.lock().unwrap();
        let class = store.classes.iter_mut().find(|c| c.id == id)?;
        class.name = req.name;
        class.image = req.image;
        class.price = req.price;
        class.available_seats = req.available_seats;
        class.status = "pending".to_string();
        Some(class.clone())
    }

    async fn set_class_status(&self, id: Uuid, status: &str) -> Option<ClassListing> {
        let mut store = self.store.lock().unwrap();
        let class = store.classes.iter_mut().find(|c| c.id == id)?;
        class.status = status.to_string();
        Some(class.clone())
    }

    async fn set_class_feedback(&self, id: Uuid, feedback: &str) -> bool {
        let mut store = self.store.lock().unwrap();
        match store.classes.iter_mut().find(|c| c.id == id) {
            Some(class) => {
                class.feedback = Some(feedback.to_string());
                true
            }
            None => false,
        }
    }

    async fn decrement_seats(&self, class_ids: &[Uuid]) -> u64 {
        let mut store = self.store.lock().unwrap();
        let mut updated = 0;
        for class in store.classes.iter_mut() {
            if class_ids.contains(&class.id) {
                class.available_seats -= 1;
                updated += 1;
            }
        }
        updated
    }

    async fn get_cart_items(&self, email: &str) -> Vec<CartItem> {
        self.store
            .lock()
            .unwrap()
            .carts
            .iter()
            .filter(|c| c.email == email)
            .cloned()
            .collect()
    }

    async fn add_cart_item(&self, req: AddCartItemRequest) -> CartItem {
        let item = CartItem {
            id: Uuid::new_v4(),
            email: req.email,
            class_id: req.class_id,
            class_name: req.class_name,
            price: req.price,
        };
        self.store.lock().unwrap().carts.push(item.clone());
        item
    }

    async fn remove_cart_item(&self, id: Uuid) -> bool {
        let mut store = self.store.lock().unwrap();
        let before = store.carts.len();
        store.carts.retain(|c| c.id != id);
        store.carts.len() < before
    }

    async fn delete_cart_items(&self, ids: &[Uuid]) -> u64 {
        let mut store = self.store.lock().unwrap();
        let before = store.carts.len();
        store.carts.retain(|c| !ids.contains(&c.id));
        (before - store.carts.len()) as u64
    }

    async fn insert_payment(&self, req: ProcessPaymentRequest) -> Payment {
        let payment = Payment {
            id: Uuid::new_v4(),
            email: req.email,
            transaction_id: req.transaction_id,
            amount: req.amount,
            cart_items: req.cart_items,
            class_items: req.class_items,
            created_at: chrono::Utc::now(),
        };
        self.store.lock().unwrap().payments.push(payment.clone());
        payment
    }

    async fn get_payments(&self, email: &str) -> Vec<Payment> {
        self.store
            .lock()
            .unwrap()
            .payments
            .iter()
            .filter(|p| p.email == email)
            .cloned()
            .collect()
    }

    async fn insert_enrollment(&self, req: CreateEnrollmentRequest) -> Enrollment {
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            student_email: req.student_email,
            class_id: req.class_id,
            class_name: req.class_name,
            created_at: chrono::Utc::now(),
        };
        self.store
            .lock()
            .unwrap()
            .enrollments
            .push(enrollment.clone());
        enrollment
    }

    async fn get_enrollments(&self, student_email: &str) -> Vec<Enrollment> {
        self.store
            .lock()
            .unwrap()
            .enrollments
            .iter()
            .filter(|e| e.student_email == student_email)
            .cloned()
            .collect()
    }
}
