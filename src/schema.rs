// Diesel table definitions. Must match schema_sqlite.sql / schema_postgres.sql.

diesel::table! {
    file_segment_mappings (id) {
        id -> Integer,
        file_path -> Text,
        bucket_id -> Text,
        segment_ids -> Text,
        alt_text -> Nullable<Text>,
        alt_text_translations -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    page_content (id) {
        id -> Integer,
        page_slug -> Text,
        section_key -> Text,
        language -> Text,
        content_type -> Text,
        content_value -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    segment_registry (segment_id) {
        segment_id -> Integer,
        page_slug -> Text,
        segment_type -> Text,
        segment_key -> Text,
        is_static -> Bool,
        deleted -> Bool,
        created_at -> Text,
    }
}

diesel::table! {
    segment_sequence (name) {
        name -> Text,
        last_value -> Integer,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    file_segment_mappings,
    page_content,
    segment_registry,
    segment_sequence,
);
