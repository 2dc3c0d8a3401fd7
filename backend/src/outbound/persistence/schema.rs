//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel
//! uses them for compile-time query validation and SQL generation. Enum
//! columns are stored as text and translated in `models.rs`.

diesel::table! {
    /// Application user accounts.
    users (id) {
        id -> Uuid,
        /// Normalised (lowercase) address, unique per deployment.
        email -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        role -> Varchar,
        image -> Nullable<Varchar>,
        /// Encoded Argon2 hash, never exposed over the wire.
        password_hash -> Varchar,
    }
}

diesel::table! {
    /// Employee records.
    employees (id) {
        id -> Uuid,
        first_name -> Varchar,
        last_name -> Varchar,
        department -> Varchar,
        /// Monthly salary denominated in `currency`.
        salary -> Float8,
        currency -> Varchar,
        tech_stack -> Varchar,
        is_employed -> Bool,
        hiring_date -> Date,
        termination_date -> Nullable<Date>,
        image -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Project records. Assignments live in `project_assignments`.
    projects (id) {
        id -> Uuid,
        /// Unique per deployment, compared case-insensitively.
        name -> Varchar,
        description -> Text,
        start_date -> Date,
        end_date -> Date,
        actual_end_date -> Nullable<Date>,
        project_type -> Varchar,
        hourly_rate -> Float8,
        project_value_bam -> Float8,
        project_velocity -> Float8,
        sales_channel -> Varchar,
        project_status -> Varchar,
    }
}

diesel::table! {
    /// Join table assigning employees to projects.
    project_assignments (project_id, employee_id) {
        project_id -> Uuid,
        employee_id -> Uuid,
        part_time -> Bool,
    }
}

diesel::table! {
    /// Expense categories.
    expense_categories (id) {
        id -> Uuid,
        /// Unique per deployment, compared case-insensitively.
        name -> Varchar,
        description -> Text,
    }
}

diesel::table! {
    /// Monthly expenses, unique per `(year, month, expense_category_id)`.
    expenses (id) {
        id -> Uuid,
        year -> Int4,
        /// Calendar month number, 1 through 12.
        month -> Int4,
        planned_expense -> Float8,
        actual_expense -> Nullable<Float8>,
        expense_category_id -> Uuid,
    }
}

diesel::table! {
    /// Invoices raised against clients.
    invoices (id) {
        id -> Uuid,
        client -> Varchar,
        industry -> Varchar,
        total_hours_billed -> Int4,
        amount_billed_bam -> Float8,
        invoice_status -> Varchar,
    }
}

diesel::table! {
    /// Password reset token digests. Only the SHA-256 digest is stored.
    password_reset_tokens (user_id, token_digest) {
        user_id -> Uuid,
        token_digest -> Varchar,
        expires_at -> Timestamptz,
    }
}

diesel::joinable!(project_assignments -> projects (project_id));
diesel::joinable!(project_assignments -> employees (employee_id));
diesel::joinable!(expenses -> expense_categories (expense_category_id));

diesel::allow_tables_to_appear_in_same_query!(
    employees,
    expense_categories,
    expenses,
    project_assignments,
    projects,
);
