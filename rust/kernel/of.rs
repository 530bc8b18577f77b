// SPDX-License-Identifier: GPL-2.0

//! Device Tree / Open Firmware abstractions.
//!
//! C header: [`include/linux/of_device.h`](srctree/include/linux/of_device.h)

/// An open firmware device id, matched against a node's `compatible` property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceId(&'static str);

impl DeviceId {
    /// Create a new device id from an OF 'compatible' string.
    pub const fn new(compatible: &'static str) -> Self {
        Self(compatible)
    }

    /// Returns the `compatible` string.
    pub const fn compatible(&self) -> &'static str {
        self.0
    }
}

/// OF [`DeviceId`] table.
pub struct IdTable<T: 'static> {
    ids: &'static [(DeviceId, T)],
}

impl<T: 'static> IdTable<T> {
    // macro use only
    #[doc(hidden)]
    pub const fn new(ids: &'static [(DeviceId, T)]) -> Self {
        Self { ids }
    }

    /// Returns the information attached to `compatible`.
    pub fn info(&self, compatible: &str) -> Option<&'static T> {
        let ids = self.ids;

        ids.iter()
            .find(|(id, _)| id.compatible() == compatible)
            .map(|(_, info)| info)
    }
}

/// Create an OF `IdTable`.
///
/// # Examples
///
/// ```
/// use kernel::of;
///
/// kernel::of_device_table!(OF_TABLE, (), [(of::DeviceId::new("adi,adv7511"), ())]);
///
/// assert!(OF_TABLE.info("adi,adv7511").is_some());
/// ```
#[macro_export]
macro_rules! of_device_table {
    ($table_name:ident, $id_info_type: ty, $table_data: expr) => {
        const $table_name: $crate::of::IdTable<$id_info_type> = {
            const IDS: &[($crate::of::DeviceId, $id_info_type)] = &$table_data;
            $crate::of::IdTable::new(IDS)
        };
    };
}
