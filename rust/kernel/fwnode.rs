// SPDX-License-Identifier: GPL-2.0

//! Firmware device node object handle type definition.
//!
//! C header: [`include/linux/fwnode.h`](srctree/include/linux/fwnode.h)
//!
//! A [`FwNode`] carries the board description of one device: the device tree properties a
//! driver reads at probe time. Nodes are built by the board code (or by tests) with the
//! `with_*` methods.

use crate::{
    error::{code::*, Result},
    types::Integer,
};
use std::collections::BTreeMap;

/// Value of a single firmware property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// Property without a value, e.g. `adi,embedded-sync;`.
    Bool,
    /// Integer cells.
    Ints(Vec<i64>),
    /// String list.
    Strings(Vec<String>),
}

/// A firmware node: a named set of properties.
#[derive(Debug, Clone, Default)]
pub struct FwNode {
    props: BTreeMap<String, Property>,
}

impl FwNode {
    /// Creates a node without properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a boolean property.
    pub fn with_bool(mut self, name: &str) -> Self {
        self.props.insert(name.into(), Property::Bool);
        self
    }

    /// Adds a single-cell integer property.
    pub fn with_int(self, name: &str, val: i64) -> Self {
        self.with_ints(name, &[val])
    }

    /// Adds an integer array property.
    pub fn with_ints(mut self, name: &str, vals: &[i64]) -> Self {
        self.props.insert(name.into(), Property::Ints(vals.to_vec()));
        self
    }

    /// Adds a string property.
    pub fn with_string(mut self, name: &str, val: &str) -> Self {
        self.props
            .insert(name.into(), Property::Strings(vec![val.into()]));
        self
    }

    /// Returns if a firmware property `name` is present
    pub fn property_present(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    /// Returns if a firmware property `name` is true or false
    pub fn property_read_bool(&self, name: &str) -> bool {
        self.property_present(name)
    }

    /// Returns the first string of firmware string property `name`
    pub fn property_read_string(&self, name: &str) -> Result<String> {
        match self.props.get(name) {
            None => Err(EINVAL),
            Some(Property::Strings(strs)) => strs.first().cloned().ok_or(ENODATA),
            Some(_) => Err(EINVAL),
        }
    }

    /// Returns the index of matching string `match_str` for firmware string property `name`
    pub fn property_match_string(&self, name: &str, match_str: &str) -> Result<usize> {
        match self.props.get(name) {
            None => Err(EINVAL),
            Some(Property::Strings(strs)) => strs
                .iter()
                .position(|s| s == match_str)
                .ok_or(ENODATA),
            Some(_) => Err(EINVAL),
        }
    }

    /// Returns firmware property `name` integer scalar value
    pub fn property_read<T: Integer>(&self, name: &str, default: Option<T>) -> Result<T> {
        let default = default.map(|default| [default; 1]);

        let val = Self::property_read_array(self, name, default)?;
        Ok(val[0])
    }

    /// Returns firmware property `name` integer array values
    ///
    /// The default is used only when the property is absent. A property with fewer than `N`
    /// cells fails with `EOVERFLOW`, as does a cell that does not fit in `T`.
    pub fn property_read_array<T: Integer, const N: usize>(
        &self,
        name: &str,
        default: Option<[T; N]>,
    ) -> Result<[T; N]> {
        let cells = match self.props.get(name) {
            Some(Property::Ints(cells)) => cells,
            Some(_) => return Err(ENODATA),
            None => return default.ok_or(EINVAL),
        };

        if cells.len() < N {
            return Err(EOVERFLOW);
        }

        let mut val = Vec::with_capacity(N);
        for &cell in &cells[..N] {
            val.push(T::try_from(cell).map_err(|_| EOVERFLOW)?);
        }

        val.try_into().map_err(|_| EOVERFLOW)
    }

    /// Returns integer array length for firmware property `name`
    pub fn property_count_elem<T: Integer>(&self, name: &str) -> Result<usize> {
        match self.props.get(name) {
            Some(Property::Ints(cells)) => Ok(cells.len()),
            Some(_) => Err(ENODATA),
            None => Err(EINVAL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> FwNode {
        FwNode::new()
            .with_bool("adi,embedded-sync")
            .with_int("adi,input-depth", 8)
            .with_int("adi,clock-delay", -400)
            .with_ints("reg", &[0x39, 0x3f])
            .with_string("adi,input-colorspace", "yuv422")
    }

    #[test]
    fn bool_and_presence() {
        let node = node();
        assert!(node.property_read_bool("adi,embedded-sync"));
        assert!(!node.property_read_bool("adi,force-hpd"));
        assert!(node.property_present("reg"));
    }

    #[test]
    fn integers() {
        let node = node();
        assert_eq!(node.property_read::<u32>("adi,input-depth", None), Ok(8));
        assert_eq!(node.property_read::<i32>("adi,clock-delay", None), Ok(-400));
        assert_eq!(node.property_read::<u32>("adi,clock-delay", None), Err(EOVERFLOW));
        assert_eq!(node.property_read::<u32>("adi,dsi-lanes", None), Err(EINVAL));
        assert_eq!(node.property_read::<u32>("adi,dsi-lanes", Some(4)), Ok(4));
        assert_eq!(node.property_read_array::<u16, 2>("reg", None), Ok([0x39, 0x3f]));
        assert_eq!(node.property_read_array::<u16, 3>("reg", None), Err(EOVERFLOW));
        assert_eq!(node.property_count_elem::<u32>("reg"), Ok(2));
        assert_eq!(node.property_read::<u32>("adi,input-colorspace", None), Err(ENODATA));
    }

    #[test]
    fn strings() {
        let node = node();
        assert_eq!(
            node.property_read_string("adi,input-colorspace").as_deref(),
            Ok("yuv422")
        );
        assert_eq!(node.property_match_string("adi,input-colorspace", "yuv422"), Ok(0));
        assert_eq!(
            node.property_match_string("adi,input-colorspace", "rgb"),
            Err(ENODATA)
        );
        assert_eq!(node.property_read_string("adi,input-clock"), Err(EINVAL));
    }
}
