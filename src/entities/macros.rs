//! Macros for reducing boilerplate when defining records.
//!
//! Every business record carries the same envelope (id, tenant, managed
//! timestamps, soft-delete marker); `impl_record!` generates the struct,
//! the `Entity` implementation, a constructor, and the timestamp helpers.

/// Define a business record with the common envelope fields.
///
/// # Example
///
/// ```rust,ignore
/// use meridian::impl_record;
///
/// impl_record!(
///     Territory,
///     "territory",
///     "territories",
///     {
///         code: String,
///         name: String,
///         region: Option<String>,
///     }
/// );
///
/// let t = Territory::new(tenant_id, "NA-WEST".into(), "West".into(), None);
/// ```
#[macro_export]
macro_rules! impl_record {
    (
        $type:ident,
        $doc_type:expr,
        $resource:expr,
        {
            $( $(#[$fmeta:meta])* $field:ident : $fty:ty ),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Unique identifier for this record
            pub id: ::uuid::Uuid,

            /// Owning tenant
            pub tenant_id: ::uuid::Uuid,

            /// When this record was created
            pub created_at: ::chrono::DateTime<::chrono::Utc>,

            /// When this record was last updated
            pub updated_at: ::chrono::DateTime<::chrono::Utc>,

            /// When this record was soft-deleted (if applicable)
            pub deleted_at: Option<::chrono::DateTime<::chrono::Utc>>,

            $( $(#[$fmeta])* pub $field : $fty ),*
        }

        impl $crate::core::entity::Entity for $type {
            fn doc_type() -> &'static str {
                $doc_type
            }

            fn resource_name() -> &'static str {
                $resource
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn tenant_id(&self) -> ::uuid::Uuid {
                self.tenant_id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }

            fn deleted_at(&self) -> Option<::chrono::DateTime<::chrono::Utc>> {
                self.deleted_at
            }
        }

        impl $type {
            /// Create a new record under the given tenant.
            pub fn new(
                tenant_id: ::uuid::Uuid,
                $( $field: $fty ),*
            ) -> Self {
                let now = ::chrono::Utc::now();
                Self {
                    id: ::uuid::Uuid::new_v4(),
                    tenant_id,
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                    $( $field ),*
                }
            }

            /// Update the updated_at timestamp to now.
            pub fn touch(&mut self) {
                self.updated_at = ::chrono::Utc::now();
            }

            /// Soft delete this record (sets deleted_at).
            pub fn soft_delete(&mut self) {
                self.deleted_at = Some(::chrono::Utc::now());
                self.updated_at = ::chrono::Utc::now();
            }

            /// Restore a soft-deleted record.
            #[allow(dead_code)]
            pub fn restore(&mut self) {
                self.deleted_at = None;
                self.updated_at = ::chrono::Utc::now();
            }
        }
    };
}
