use crate::core::io::traits::LatticeFile;
use crate::core::models::bondset::BondVectorSet;
use crate::core::models::ids::UnitId;
use crate::core::models::lattice::{Axis, Wall};
use crate::core::models::system::MolecularSystem;
use itertools::Itertools;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConformationError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Table error: {0}")]
    Table(#[from] csv::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ConformationParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(&'static str),
}

#[derive(Debug, Error)]
pub enum ConformationParseErrorKind {
    #[error("Expected {expected} values for '{key}', found {found}")]
    WrongArity {
        key: String,
        expected: usize,
        found: usize,
    },
    #[error("Invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
    #[error("Invalid bond list '{0}'")]
    InvalidBondList(String),
}

/// One row of the unit table.
#[derive(Debug, Serialize, Deserialize)]
struct UnitRecord {
    id: UnitId,
    x: i32,
    y: i32,
    z: i32,
    movable: bool,
    bonds: String,
}

/// Tab-separated conformation file.
///
/// ```text
/// # age 0
/// # box 16 16 16
/// # periodic 1 1 0
/// # wall 0 0 14 0 0 1
/// id	x	y	z	movable	bonds
/// 0	0	0	0	false	1
/// 1	0	0	2	true	0
/// ```
///
/// Comment lines with an unrecognized key are ignored. The classic bond-vector set is
/// registered on every system read from this format.
pub struct ConformationFile;

fn parse_values<T: FromStr>(
    key: &str,
    values: &[&str],
    expected: usize,
    line: usize,
) -> Result<Vec<T>, ConformationError> {
    if values.len() != expected {
        return Err(ConformationError::Parse {
            line,
            kind: ConformationParseErrorKind::WrongArity {
                key: key.to_string(),
                expected,
                found: values.len(),
            },
        });
    }
    values
        .iter()
        .map(|value| {
            value.parse::<T>().map_err(|_| ConformationError::Parse {
                line,
                kind: ConformationParseErrorKind::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                },
            })
        })
        .collect()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

fn parse_bond_list(bonds: &str, line: usize) -> Result<Vec<UnitId>, ConformationError> {
    bonds
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<UnitId>().map_err(|_| ConformationError::Parse {
                line,
                kind: ConformationParseErrorKind::InvalidBondList(bonds.to_string()),
            })
        })
        .collect()
}

impl LatticeFile for ConformationFile {
    type Error = ConformationError;

    fn read_from(reader: &mut impl BufRead) -> Result<MolecularSystem, Self::Error> {
        let mut system = MolecularSystem::new();
        let mut box_seen = false;
        let mut table = String::new();
        // 1-based source line of every table line, header included.
        let mut table_lines = Vec::new();

        for (index, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some(comment) = trimmed.strip_prefix('#') else {
                table.push_str(trimmed);
                table.push('\n');
                table_lines.push(line_num);
                continue;
            };

            let tokens: Vec<&str> = comment.split_whitespace().collect();
            let Some((&key, values)) = tokens.split_first() else {
                continue;
            };
            match key {
                "age" => {
                    let age = parse_values::<u64>(key, values, 1, line_num)?;
                    system.set_age(age[0]);
                }
                "box" => {
                    let extents = parse_values::<u32>(key, values, 3, line_num)?;
                    for axis in Axis::ALL {
                        system.set_box_extent(axis, extents[axis.index()]);
                    }
                    box_seen = true;
                }
                "periodic" => {
                    let raw = parse_values::<String>(key, values, 3, line_num)?;
                    for axis in Axis::ALL {
                        let value = &raw[axis.index()];
                        let flag = parse_flag(value).ok_or_else(|| ConformationError::Parse {
                            line: line_num,
                            kind: ConformationParseErrorKind::InvalidValue {
                                key: key.to_string(),
                                value: value.clone(),
                            },
                        })?;
                        system.set_periodic(axis, flag);
                    }
                }
                "wall" => {
                    let v = parse_values::<i32>(key, values, 6, line_num)?;
                    system.add_wall(Wall::new(
                        Point3::new(v[0], v[1], v[2]),
                        Vector3::new(v[3], v[4], v[5]),
                    ));
                }
                _ => {}
            }
        }

        if !box_seen {
            return Err(ConformationError::MissingRecord("box"));
        }
        system.register_bond_set(&BondVectorSet::classic());

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(table.as_bytes());

        let mut pending_bonds = Vec::new();
        for (row, result) in csv_reader.deserialize::<UnitRecord>().enumerate() {
            let record = result?;
            let line_num = table_lines.get(row + 1).copied().unwrap_or(0);
            if record.id != row {
                return Err(ConformationError::Inconsistency(format!(
                    "unit ids must be contiguous from 0; line {} has id {} where {} was expected",
                    line_num, record.id, row
                )));
            }
            let id = system.add_unit_at(Point3::new(record.x, record.y, record.z));
            system.set_movable(id, record.movable).ok_or_else(|| {
                ConformationError::Inconsistency(format!(
                    "line {} refers to unknown unit {}",
                    line_num, id
                ))
            })?;
            for partner in parse_bond_list(&record.bonds, line_num)? {
                pending_bonds.push((id, partner));
            }
        }

        for (id, partner) in pending_bonds {
            system.connect(id, partner).ok_or_else(|| {
                ConformationError::Inconsistency(format!(
                    "unit {} is bonded to invalid partner {}",
                    id, partner
                ))
            })?;
        }

        let foreign_bonds = system
            .bonds()
            .iter()
            .filter(|bond| {
                let (Some(a), Some(b)) = (
                    system.position(bond.unit1_id),
                    system.position(bond.unit2_id),
                ) else {
                    return false;
                };
                !system.bond_set().contains(&(b - a))
            })
            .count();
        if foreign_bonds > 0 {
            warn!(
                count = foreign_bonds,
                "Conformation contains bonds outside the classic bond-vector set."
            );
        }

        system.synchronize();
        Ok(system)
    }

    fn write_to(system: &MolecularSystem, writer: &mut impl Write) -> Result<(), Self::Error> {
        let sim_box = system.simulation_box();
        writeln!(writer, "# age {}", system.age())?;
        writeln!(writer, "# box {}", sim_box.extents.iter().join(" "))?;
        writeln!(
            writer,
            "# periodic {}",
            sim_box.periodic.iter().map(|&p| u8::from(p)).join(" ")
        )?;
        for wall in system.walls() {
            writeln!(
                writer,
                "# wall {} {} {} {} {} {}",
                wall.base.x, wall.base.y, wall.base.z, wall.normal.x, wall.normal.y, wall.normal.z
            )?;
        }

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(&mut *writer);
        for (id, unit) in system.units_iter() {
            let bonds = system
                .bonded_neighbors(id)
                .map(|neighbors| neighbors.iter().join(";"))
                .unwrap_or_default();
            csv_writer.serialize(UnitRecord {
                id,
                x: unit.position.x,
                y: unit.position.y,
                z: unit.position.z,
                movable: unit.movable,
                bonds,
            })?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
