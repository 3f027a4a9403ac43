table! {
    bookings (id) {
        id -> Unsigned<Bigint>,
        customer_id -> Unsigned<Bigint>,
        nutritionist_id -> Unsigned<Bigint>,
        date -> Datetime,
        status -> Varchar,
        payment_status -> Varchar,
        note -> Nullable<Text>,
        phone -> Nullable<Varchar>,
        created_at -> Datetime,
        updated_at -> Datetime,
    }
}

table! {
    consultation_notes (id) {
        id -> Unsigned<Bigint>,
        booking_id -> Unsigned<Bigint>,
        nutritionist_id -> Unsigned<Bigint>,
        notes -> Text,
        recommendation -> Text,
        file_url -> Varchar,
        created_at -> Datetime,
        updated_at -> Datetime,
    }
}

table! {
    nutritionists (id) {
        id -> Unsigned<Bigint>,
        user_id -> Unsigned<Bigint>,
        name -> Varchar,
        specialization -> Varchar,
        experience_years -> Integer,
        license -> Nullable<Varchar>,
        bio -> Text,
        contact -> Nullable<Varchar>,
        location -> Nullable<Varchar>,
        price_per_session -> Unsigned<Bigint>,
        available_days -> Varchar,
        available_start -> Char,
        available_end -> Char,
        photo -> Nullable<Varchar>,
        created_at -> Datetime,
        updated_at -> Datetime,
    }
}

table! {
    user_logins (token, user_id, login_time) {
        token -> Char,
        user_id -> Unsigned<Bigint>,
        login_time -> Datetime,
    }
}

table! {
    users (id) {
        id -> Unsigned<Bigint>,
        name -> Varchar,
        email -> Varchar,
        password -> Varchar,
        role -> Varchar,
        is_blocked -> Bool,
        phone -> Nullable<Varchar>,
        address -> Nullable<Varchar>,
        photo -> Nullable<Varchar>,
        created_at -> Datetime,
        updated_at -> Datetime,
    }
}

allow_tables_to_appear_in_same_query!(
    bookings,
    consultation_notes,
    nutritionists,
    user_logins,
    users,
);
