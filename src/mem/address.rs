//! physical address decoding
//!
//! maps a physical address to (channel, rank, bank group, bank, row, column)
//! under a configurable bit slicing scheme. mappings are data, not code: the
//! built-in schemes expand to the same ordered slice list a custom mapping
//! supplies directly.

use serde::{Deserialize, Serialize};

use super::config::{ConfigError, OrganizationParams};
use super::request::SubmitError;
use super::Address;

/// address mapping scheme
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMapping {
    /// Ro:Ba:Co, sequential access friendly
    RowBankColumn,
    /// Ro:Co:Ba, strided access friendly (bank bits least significant)
    RowColumnBank,
    /// Ba:Ro:Co, bank first interleaving
    BankRowColumn,
    /// user supplied bit slicing
    Custom,
}

/// one decoded field of the address
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    Channel,
    Rank,
    BankGroup,
    Bank,
    Row,
    Column,
}

/// a contiguous slice of address bits feeding one field, lsb first in the
/// mapping list. a field may be split over several slices.
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct FieldSlice {
    pub field: AddressField,
    pub width: u32,
}

/// decoded address components
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodedAddress {
    pub channel: usize,
    pub rank: usize,
    pub bank_group: usize,
    pub bank: usize,
    pub row: usize,
    pub column: usize,
}

impl DecodedAddress {
    /// flat bank index across the whole subsystem, channel major
    pub fn flat_bank(&self, org: &OrganizationParams) -> usize {
        self.channel * org.banks_per_channel() + self.channel_bank(org)
    }

    /// bank index within the channel
    pub fn channel_bank(&self, org: &OrganizationParams) -> usize {
        (self.rank * org.bank_groups_per_rank + self.bank_group) * org.banks_per_bank_group
            + self.bank
    }
}

fn log2(field: &'static str, value: usize) -> Result<u32, ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroField { field });
    }
    if !value.is_power_of_two() {
        return Err(ConfigError::NotPowerOfTwo { field, value });
    }
    Ok(value.trailing_zeros())
}

/// decodes physical addresses for one organization
#[derive(Debug, Clone)]
pub struct AddressDecoder {
    slices: Vec<FieldSlice>,
    total_bits: u32,
    rows_per_bank: usize,
}

impl AddressDecoder {
    pub fn new(
        org: &OrganizationParams,
        mapping: AddressMapping,
        custom: Option<&[FieldSlice]>,
    ) -> Result<Self, ConfigError> {
        let column = log2("columns_per_row", org.columns_per_row)?;
        let bank = log2("banks_per_bank_group", org.banks_per_bank_group)?;
        let bank_group = log2("bank_groups_per_rank", org.bank_groups_per_rank)?;
        let row = log2("rows_per_bank", org.rows_per_bank)?;
        let rank = log2("ranks_per_channel", org.ranks_per_channel)?;
        let channel = log2("num_channels", org.num_channels)?;

        let slice = |field, width| FieldSlice { field, width };
        let slices = match mapping {
            AddressMapping::RowBankColumn => vec![
                slice(AddressField::Column, column),
                slice(AddressField::Bank, bank),
                slice(AddressField::BankGroup, bank_group),
                slice(AddressField::Row, row),
                slice(AddressField::Rank, rank),
                slice(AddressField::Channel, channel),
            ],
            AddressMapping::RowColumnBank => vec![
                slice(AddressField::Bank, bank),
                slice(AddressField::BankGroup, bank_group),
                slice(AddressField::Column, column),
                slice(AddressField::Row, row),
                slice(AddressField::Rank, rank),
                slice(AddressField::Channel, channel),
            ],
            AddressMapping::BankRowColumn => vec![
                slice(AddressField::Column, column),
                slice(AddressField::Row, row),
                slice(AddressField::Bank, bank),
                slice(AddressField::BankGroup, bank_group),
                slice(AddressField::Rank, rank),
                slice(AddressField::Channel, channel),
            ],
            AddressMapping::Custom => {
                let custom = custom.ok_or_else(|| {
                    ConfigError::BadCustomMapping("no slices supplied".to_string())
                })?;
                let required = [
                    (AddressField::Channel, channel),
                    (AddressField::Rank, rank),
                    (AddressField::BankGroup, bank_group),
                    (AddressField::Bank, bank),
                    (AddressField::Row, row),
                    (AddressField::Column, column),
                ];
                for (field, want) in required {
                    let got: u32 = custom
                        .iter()
                        .filter(|s| s.field == field)
                        .map(|s| s.width)
                        .sum();
                    if got != want {
                        return Err(ConfigError::BadCustomMapping(format!(
                            "{field:?} covers {got} bits, organization needs {want}"
                        )));
                    }
                }
                custom.to_vec()
            }
        };

        let total_bits = slices.iter().map(|s| s.width).sum();
        Ok(Self {
            slices,
            total_bits,
            rows_per_bank: org.rows_per_bank,
        })
    }

    /// number of address bits the mapping consumes
    pub fn total_bits(&self) -> u32 {
        self.total_bits
    }

    pub fn decode(&self, address: Address) -> Result<DecodedAddress, SubmitError> {
        if self.total_bits < Address::BITS && address >> self.total_bits != 0 {
            return Err(SubmitError::InvalidAddress {
                address,
                reason: "beyond addressable capacity",
            });
        }

        let mut decoded = DecodedAddress::default();
        // running shift per field, so split slices concatenate lsb first
        let mut shifts = [0u32; 6];
        let mut offset = 0u32;
        for s in &self.slices {
            let value = ((address >> offset) & ((1u64 << s.width) - 1)) as usize;
            let (target, shift) = match s.field {
                AddressField::Channel => (&mut decoded.channel, &mut shifts[0]),
                AddressField::Rank => (&mut decoded.rank, &mut shifts[1]),
                AddressField::BankGroup => (&mut decoded.bank_group, &mut shifts[2]),
                AddressField::Bank => (&mut decoded.bank, &mut shifts[3]),
                AddressField::Row => (&mut decoded.row, &mut shifts[4]),
                AddressField::Column => (&mut decoded.column, &mut shifts[5]),
            };
            *target |= value << *shift;
            *shift += s.width;
            offset += s.width;
        }

        if decoded.row >= self.rows_per_bank {
            return Err(SubmitError::InvalidAddress {
                address,
                reason: "row index out of range",
            });
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_org() -> OrganizationParams {
        OrganizationParams {
            num_channels: 2,
            ranks_per_channel: 1,
            bank_groups_per_rank: 4,
            banks_per_bank_group: 4,
            rows_per_bank: 1024,
            columns_per_row: 64,
            ..Default::default()
        }
    }

    #[test]
    fn row_bank_column_layout() {
        let org = small_org();
        let decoder = AddressDecoder::new(&org, AddressMapping::RowBankColumn, None).unwrap();
        // 6 column bits, 2 bank bits, 2 group bits, 10 row bits, 0 rank, 1 channel
        assert_eq!(decoder.total_bits(), 21);

        let address = (1u64 << 20) | (5 << 10) | (0b10_01 << 6) | 0b101010;
        let d = decoder.decode(address).unwrap();
        assert_eq!(d.channel, 1);
        assert_eq!(d.row, 5);
        assert_eq!(d.bank_group, 0b10);
        assert_eq!(d.bank, 0b01);
        assert_eq!(d.column, 0b101010);
    }

    #[test]
    fn column_bank_schemes_differ() {
        let org = small_org();
        let rbc = AddressDecoder::new(&org, AddressMapping::RowBankColumn, None).unwrap();
        let rcb = AddressDecoder::new(&org, AddressMapping::RowColumnBank, None).unwrap();
        // consecutive addresses stay in one bank under rbc, stride banks under rcb
        let a = rbc.decode(0).unwrap();
        let b = rbc.decode(1).unwrap();
        assert_eq!(a.bank, b.bank);
        let a = rcb.decode(0).unwrap();
        let b = rcb.decode(1).unwrap();
        assert_ne!(a.bank, b.bank);
    }

    #[test]
    fn custom_mapping_split_field() {
        let org = small_org();
        let slices = [
            FieldSlice { field: AddressField::Column, width: 3 },
            FieldSlice { field: AddressField::Bank, width: 2 },
            FieldSlice { field: AddressField::Column, width: 3 },
            FieldSlice { field: AddressField::BankGroup, width: 2 },
            FieldSlice { field: AddressField::Row, width: 10 },
            FieldSlice { field: AddressField::Rank, width: 0 },
            FieldSlice { field: AddressField::Channel, width: 1 },
        ];
        let decoder =
            AddressDecoder::new(&org, AddressMapping::Custom, Some(&slices)).unwrap();
        // column low bits 0b011, bank 0b10, column high bits 0b101
        let d = decoder.decode(0b101_10_011).unwrap();
        assert_eq!(d.column, 0b101_011);
        assert_eq!(d.bank, 0b10);
    }

    #[test]
    fn custom_mapping_must_cover_fields() {
        let org = small_org();
        let slices = [FieldSlice { field: AddressField::Column, width: 6 }];
        assert!(AddressDecoder::new(&org, AddressMapping::Custom, Some(&slices)).is_err());
    }

    #[test]
    fn out_of_range_address_rejected() {
        let org = small_org();
        let decoder = AddressDecoder::new(&org, AddressMapping::RowBankColumn, None).unwrap();
        let err = decoder.decode(1 << 21).unwrap_err();
        assert!(matches!(err, SubmitError::InvalidAddress { .. }));
    }

    #[test]
    fn flat_bank_indexing() {
        let org = small_org();
        let decoded = DecodedAddress {
            channel: 1,
            rank: 0,
            bank_group: 2,
            bank: 3,
            row: 0,
            column: 0,
        };
        assert_eq!(decoded.channel_bank(&org), 2 * 4 + 3);
        assert_eq!(decoded.flat_bank(&org), 16 + 11);
    }
}
