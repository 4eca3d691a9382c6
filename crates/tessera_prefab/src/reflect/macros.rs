//! The `reflect!` macro.

/// Describes a struct's fields for reflection.
///
/// Implements [`Reflect`](crate::Reflect) with a lazily-built descriptor
/// table and [`Visit`](crate::Visit) on top of it, so the type can be read
/// from and written to JSON and nested inside other reflected types.
/// Every listed field type must implement `Visit`.
///
/// Field order sets the order fields are written in.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Default)]
/// struct Storage {
///     group: i32,
///     key: i32,
/// }
///
/// reflect!(Storage { group: i32, key: i32 });
/// ```
#[macro_export]
macro_rules! reflect {
    ($ty:ident { $($field:ident : $fty:ty),* $(,)? }) => {
        impl $crate::Reflect for $ty {
            fn type_info() -> ::std::sync::Arc<$crate::TypeInfo<Self>> {
                static INFO: $crate::TypeInfoCell<$ty> = $crate::TypeInfoCell::new();
                INFO.get_or_init(|| {
                    $crate::TypeInfo::new(stringify!($ty))
                        $(
                            .field::<$fty>(
                                stringify!($field),
                                {
                                    fn get(value: &$ty) -> &$fty {
                                        &value.$field
                                    }
                                    get
                                },
                                {
                                    fn get_mut(value: &mut $ty) -> &mut $fty {
                                        &mut value.$field
                                    }
                                    get_mut
                                },
                            )
                        )*
                })
            }
        }

        impl $crate::Visit for $ty {
            fn read(&mut self, value: &$crate::serde_json::Value) -> $crate::ReflectResult<()> {
                <Self as $crate::Reflect>::type_info().read(self, value)
            }

            fn write(&self) -> $crate::serde_json::Value {
                <Self as $crate::Reflect>::type_info().write(self)
            }

            fn copy_from(&mut self, other: &Self) {
                <Self as $crate::Reflect>::type_info().copy(self, other);
            }
        }
    };
}
