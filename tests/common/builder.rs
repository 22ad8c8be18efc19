//! Synthesises ISO9660 images byte-by-byte for the integration tests.
//!
//! Supports plain hierarchies, Joliet supplementary descriptors with UCS-2
//! directory trees, per-record system-use injection (for SUSP / Rock Ridge
//! scenarios), continuation areas at reserved blocks, path tables, and
//! deliberately malformed trees.

use crate::common::MemoryBlockDevice;

const SECTOR: usize = 2048;

/// First block reserved for SUSP continuation areas
#[allow(dead_code)]
pub const CONT_BASE: u32 = 100;

/// Recording timestamp written into every directory record (2025-07-31)
#[allow(dead_code)]
pub const RECORD_TIME: [u8; 7] = [125, 7, 31, 12, 0, 0, 0];

#[derive(Default)]
struct BuildDir {
    children: Vec<BuildNode>,
}

enum BuildNode {
    File {
        name: String,
        joliet_name: Option<String>,
        content: Vec<u8>,
        system_use: Vec<u8>,
    },
    Dir {
        name: String,
        joliet_name: Option<String>,
        self_loop: bool,
        dir: BuildDir,
    },
}

enum Child {
    Dir(usize),
    File(usize),
}

struct FlatDir {
    parent: usize,
    name: String,
    joliet_name: Option<String>,
    self_loop: bool,
    children: Vec<Child>,
    lba: u32,
    jlba: u32,
}

struct FlatFile {
    name: String,
    joliet_name: Option<String>,
    content: Vec<u8>,
    system_use: Vec<u8>,
    lba: u32,
}

pub struct IsoBuilder {
    volume_id: String,
    with_joliet: bool,
    with_el_torito: bool,
    root_system_use: Vec<u8>,
    root: BuildDir,
    continuations: Vec<(u32, Vec<u8>)>,
    next_continuation: u32,
}

#[allow(dead_code)]
impl IsoBuilder {
    pub fn new() -> Self {
        Self {
            volume_id: "TEST".to_string(),
            with_joliet: false,
            with_el_torito: false,
            root_system_use: Vec::new(),
            root: BuildDir::default(),
            continuations: Vec::new(),
            next_continuation: CONT_BASE,
        }
    }

    pub fn volume_id(&mut self, id: &str) -> &mut Self {
        self.volume_id = id.to_string();
        self
    }

    pub fn with_joliet(&mut self) -> &mut Self {
        self.with_joliet = true;
        self
    }

    pub fn with_el_torito(&mut self) -> &mut Self {
        self.with_el_torito = true;
        self
    }

    /// System-use area attached to the root directory's `.` record
    pub fn root_system_use(&mut self, system_use: &[u8]) -> &mut Self {
        self.root_system_use = system_use.to_vec();
        self
    }

    pub fn add_file(&mut self, path: &str, content: &[u8]) -> &mut Self {
        self.add_file_with(path, content, &[], None)
    }

    pub fn add_file_with(
        &mut self,
        path: &str,
        content: &[u8],
        system_use: &[u8],
        joliet_name: Option<&str>,
    ) -> &mut Self {
        let (dir, name) = Self::descend(&mut self.root, path);
        dir.children.push(BuildNode::File {
            name,
            joliet_name: joliet_name.map(str::to_string),
            content: content.to_vec(),
            system_use: system_use.to_vec(),
        });
        self
    }

    pub fn add_dir(&mut self, path: &str) -> &mut Self {
        let (dir, name) = Self::descend(&mut self.root, path);
        dir.children.push(BuildNode::Dir {
            name,
            joliet_name: None,
            self_loop: false,
            dir: BuildDir::default(),
        });
        self
    }

    /// Directory whose extent carries an extra record pointing back at the
    /// extent itself
    pub fn add_self_loop_dir(&mut self, path: &str) -> &mut Self {
        let (dir, name) = Self::descend(&mut self.root, path);
        dir.children.push(BuildNode::Dir {
            name,
            joliet_name: None,
            self_loop: true,
            dir: BuildDir::default(),
        });
        self
    }

    /// Reserve a block in the continuation region
    pub fn reserve_continuation(&mut self) -> u32 {
        let lba = self.next_continuation;
        self.next_continuation += 1;
        lba
    }

    /// Place raw bytes at a reserved continuation block
    pub fn add_continuation(&mut self, lba: u32, data: &[u8]) -> &mut Self {
        self.continuations.push((lba, data.to_vec()));
        self
    }

    fn descend<'a>(mut dir: &'a mut BuildDir, path: &str) -> (&'a mut BuildDir, String) {
        let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        let (leaf, parents) = components.split_last().expect("empty path");
        for component in parents {
            let position = dir.children.iter().position(|node| {
                matches!(node, BuildNode::Dir { name, .. } if name == component)
            });
            let index = match position {
                Some(index) => index,
                None => {
                    dir.children.push(BuildNode::Dir {
                        name: component.to_string(),
                        joliet_name: None,
                        self_loop: false,
                        dir: BuildDir::default(),
                    });
                    dir.children.len() - 1
                }
            };
            dir = match &mut dir.children[index] {
                BuildNode::Dir { dir, .. } => dir,
                BuildNode::File { .. } => panic!("path component is a file"),
            };
        }
        (dir, leaf.to_string())
    }

    pub fn build(&self) -> MemoryBlockDevice {
        let mut dirs = vec![FlatDir {
            parent: 0,
            name: String::new(),
            joliet_name: None,
            self_loop: false,
            children: Vec::new(),
            lba: 0,
            jlba: 0,
        }];
        let mut files = Vec::new();
        flatten(&self.root, 0, &mut dirs, &mut files);

        // descriptor layout
        let pvd_lba = 16u32;
        let mut cursor = 17u32;
        let boot_lba = self.with_el_torito.then(|| {
            cursor += 1;
            cursor - 1
        });
        let svd_lba = self.with_joliet.then(|| {
            cursor += 1;
            cursor - 1
        });
        let term_lba = cursor;
        cursor += 1;

        let pt_l = cursor;
        let pt_m = cursor + 1;
        cursor += 2;
        let (jpt_l, jpt_m) = if self.with_joliet {
            cursor += 2;
            (cursor - 2, cursor - 1)
        } else {
            (0, 0)
        };

        for dir in dirs.iter_mut() {
            dir.lba = cursor;
            cursor += 1;
        }
        if self.with_joliet {
            for dir in dirs.iter_mut() {
                dir.jlba = cursor;
                cursor += 1;
            }
        }
        for file in files.iter_mut() {
            file.lba = cursor;
            cursor += ((file.content.len() + SECTOR - 1) / SECTOR).max(1) as u32;
        }
        assert!(cursor <= CONT_BASE, "image layout grew into the continuation region");

        let total_sectors = self.next_continuation.max(cursor).max(CONT_BASE) + 4;
        let mut data = vec![0u8; total_sectors as usize * SECTOR];

        // primary path tables
        let primary_table = path_table_bytes(&dirs, false, false);
        let primary_table_be = path_table_bytes(&dirs, true, false);
        write_at(&mut data, pt_l as usize * SECTOR, &primary_table);
        write_at(&mut data, pt_m as usize * SECTOR, &primary_table_be);

        // descriptors
        self.write_pvd(&mut data, pvd_lba, total_sectors, pt_l, pt_m, primary_table.len(), dirs[0].lba);
        if let Some(lba) = boot_lba {
            write_boot_record(&mut data, lba);
        }
        if let Some(lba) = svd_lba {
            let joliet_table = path_table_bytes(&dirs, false, true);
            let joliet_table_be = path_table_bytes(&dirs, true, true);
            write_at(&mut data, jpt_l as usize * SECTOR, &joliet_table);
            write_at(&mut data, jpt_m as usize * SECTOR, &joliet_table_be);
            self.write_svd(&mut data, lba, total_sectors, jpt_l, jpt_m, joliet_table.len(), dirs[0].jlba);
        }
        let term_offset = term_lba as usize * SECTOR;
        data[term_offset] = 255;
        data[term_offset + 1..term_offset + 6].copy_from_slice(b"CD001");
        data[term_offset + 6] = 1;

        // directory extents
        for (index, dir) in dirs.iter().enumerate() {
            let root_su = if index == 0 { &self.root_system_use[..] } else { &[] };
            let sector = dir_sector(dir, &dirs, &files, false, root_su);
            write_at(&mut data, dir.lba as usize * SECTOR, &sector);
            if self.with_joliet {
                let jsector = dir_sector(dir, &dirs, &files, true, &[]);
                write_at(&mut data, dir.jlba as usize * SECTOR, &jsector);
            }
        }

        // file contents
        for file in &files {
            write_at(&mut data, file.lba as usize * SECTOR, &file.content);
        }

        // continuation areas
        for (lba, bytes) in &self.continuations {
            write_at(&mut data, *lba as usize * SECTOR, bytes);
        }

        MemoryBlockDevice::new(data)
    }

    fn write_pvd(
        &self,
        data: &mut [u8],
        lba: u32,
        total_sectors: u32,
        pt_l: u32,
        pt_m: u32,
        pt_size: usize,
        root_lba: u32,
    ) {
        let base = lba as usize * SECTOR;
        data[base] = 1;
        data[base + 1..base + 6].copy_from_slice(b"CD001");
        data[base + 6] = 1;
        write_padded(&mut data[base + 8..base + 40], b"TEST SYSTEM");
        write_padded(&mut data[base + 40..base + 72], self.volume_id.as_bytes());
        write_both_u32(&mut data[base + 80..], total_sectors);
        write_both_u16(&mut data[base + 120..], 1);
        write_both_u16(&mut data[base + 124..], 1);
        write_both_u16(&mut data[base + 128..], 2048);
        write_both_u32(&mut data[base + 132..], pt_size as u32);
        data[base + 140..base + 144].copy_from_slice(&pt_l.to_le_bytes());
        data[base + 148..base + 152].copy_from_slice(&pt_m.to_be_bytes());
        write_root_record(&mut data[base + 156..base + 190], root_lba);
        data[base + 881] = 1;
    }

    fn write_svd(
        &self,
        data: &mut [u8],
        lba: u32,
        total_sectors: u32,
        pt_l: u32,
        pt_m: u32,
        pt_size: usize,
        root_lba: u32,
    ) {
        let base = lba as usize * SECTOR;
        data[base] = 2;
        data[base + 1..base + 6].copy_from_slice(b"CD001");
        data[base + 6] = 1;
        write_at(&mut data[base + 8..base + 40], 0, &ucs2_be("TEST SYSTEM"));
        write_at(&mut data[base + 40..base + 72], 0, &ucs2_be(&self.volume_id));
        write_both_u32(&mut data[base + 80..], total_sectors);
        data[base + 88..base + 91].copy_from_slice(b"%/E");
        write_both_u16(&mut data[base + 120..], 1);
        write_both_u16(&mut data[base + 124..], 1);
        write_both_u16(&mut data[base + 128..], 2048);
        write_both_u32(&mut data[base + 132..], pt_size as u32);
        data[base + 140..base + 144].copy_from_slice(&pt_l.to_le_bytes());
        data[base + 148..base + 152].copy_from_slice(&pt_m.to_be_bytes());
        write_root_record(&mut data[base + 156..base + 190], root_lba);
        data[base + 881] = 1;
    }
}

fn flatten(dir: &BuildDir, parent: usize, dirs: &mut Vec<FlatDir>, files: &mut Vec<FlatFile>) {
    let this = parent;
    for node in &dir.children {
        match node {
            BuildNode::File {
                name,
                joliet_name,
                content,
                system_use,
            } => {
                files.push(FlatFile {
                    name: name.clone(),
                    joliet_name: joliet_name.clone(),
                    content: content.clone(),
                    system_use: system_use.clone(),
                    lba: 0,
                });
                let file_index = files.len() - 1;
                dirs[this].children.push(Child::File(file_index));
            }
            BuildNode::Dir {
                name,
                joliet_name,
                self_loop,
                dir: subdir,
            } => {
                dirs.push(FlatDir {
                    parent: this,
                    name: name.clone(),
                    joliet_name: joliet_name.clone(),
                    self_loop: *self_loop,
                    children: Vec::new(),
                    lba: 0,
                    jlba: 0,
                });
                let dir_index = dirs.len() - 1;
                dirs[this].children.push(Child::Dir(dir_index));
                flatten(subdir, dir_index, dirs, files);
            }
        }
    }
}

fn dir_sector(
    dir: &FlatDir,
    dirs: &[FlatDir],
    files: &[FlatFile],
    joliet: bool,
    root_system_use: &[u8],
) -> Vec<u8> {
    let mut sector = Vec::with_capacity(SECTOR);
    let own_lba = if joliet { dir.jlba } else { dir.lba };
    let parent = &dirs[dir.parent];
    let parent_lba = if joliet { parent.jlba } else { parent.lba };

    push_record(&mut sector, own_lba, SECTOR as u32, 0x02, &[0x00], root_system_use);
    push_record(&mut sector, parent_lba, SECTOR as u32, 0x02, &[0x01], &[]);

    for child in &dir.children {
        match child {
            Child::Dir(index) => {
                let subdir = &dirs[*index];
                let lba = if joliet { subdir.jlba } else { subdir.lba };
                let id = encode_name(&subdir.name, subdir.joliet_name.as_deref(), joliet);
                push_record(&mut sector, lba, SECTOR as u32, 0x02, &id, &[]);
            }
            Child::File(index) => {
                let file = &files[*index];
                let id = encode_name(&file.name, file.joliet_name.as_deref(), joliet);
                push_record(
                    &mut sector,
                    file.lba,
                    file.content.len() as u32,
                    0x00,
                    &id,
                    &file.system_use,
                );
            }
        }
    }
    if dir.self_loop {
        push_record(&mut sector, own_lba, SECTOR as u32, 0x02, b"LOOPDIR", &[]);
    }

    assert!(sector.len() <= SECTOR, "directory extent exceeds one sector");
    sector.resize(SECTOR, 0);
    sector
}

fn encode_name(name: &str, joliet_name: Option<&str>, joliet: bool) -> Vec<u8> {
    if joliet {
        ucs2_be(joliet_name.unwrap_or(name))
    } else {
        name.as_bytes().to_vec()
    }
}

fn push_record(out: &mut Vec<u8>, lba: u32, size: u32, flags: u8, id: &[u8], system_use: &[u8]) {
    let pad = usize::from(id.len() % 2 == 0);
    let length = 33 + id.len() + pad + system_use.len();
    assert!(length <= 255, "directory record too long");

    let start = out.len();
    out.resize(start + length, 0);
    let record = &mut out[start..];
    record[0] = length as u8;
    write_both_u32(&mut record[2..], lba);
    write_both_u32(&mut record[10..], size);
    record[18..25].copy_from_slice(&RECORD_TIME);
    record[25] = flags;
    write_both_u16(&mut record[28..], 1);
    record[32] = id.len() as u8;
    record[33..33 + id.len()].copy_from_slice(id);
    record[33 + id.len() + pad..].copy_from_slice(system_use);
}

fn write_root_record(out: &mut [u8], root_lba: u32) {
    out[0] = 34;
    write_both_u32(&mut out[2..], root_lba);
    write_both_u32(&mut out[10..], SECTOR as u32);
    out[18..25].copy_from_slice(&RECORD_TIME);
    out[25] = 0x02;
    write_both_u16(&mut out[28..], 1);
    out[32] = 1;
    out[33] = 0x00;
}

fn path_table_bytes(dirs: &[FlatDir], big_endian: bool, joliet: bool) -> Vec<u8> {
    let mut table = Vec::new();
    for dir in dirs {
        let id = if dir.name.is_empty() {
            vec![0x00]
        } else {
            encode_name(&dir.name, dir.joliet_name.as_deref(), joliet)
        };
        let lba = if joliet { dir.jlba } else { dir.lba };
        let parent = dir.parent as u16 + 1;
        table.push(id.len() as u8);
        table.push(0);
        if big_endian {
            table.extend_from_slice(&lba.to_be_bytes());
            table.extend_from_slice(&parent.to_be_bytes());
        } else {
            table.extend_from_slice(&lba.to_le_bytes());
            table.extend_from_slice(&parent.to_le_bytes());
        }
        table.extend_from_slice(&id);
        if id.len() % 2 == 1 {
            table.push(0);
        }
    }
    table
}

fn write_boot_record(data: &mut [u8], lba: u32) {
    let base = lba as usize * SECTOR;
    data[base] = 0;
    data[base + 1..base + 6].copy_from_slice(b"CD001");
    data[base + 6] = 1;
    data[base + 7..base + 30].copy_from_slice(b"EL TORITO SPECIFICATION");
}

fn write_at(data: &mut [u8], offset: usize, bytes: &[u8]) {
    data[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn write_padded(out: &mut [u8], bytes: &[u8]) {
    out.fill(b' ');
    out[..bytes.len()].copy_from_slice(bytes);
}

fn write_both_u16(out: &mut [u8], value: u16) {
    out[0..2].copy_from_slice(&value.to_le_bytes());
    out[2..4].copy_from_slice(&value.to_be_bytes());
}

fn write_both_u32(out: &mut [u8], value: u32) {
    out[0..4].copy_from_slice(&value.to_le_bytes());
    out[4..8].copy_from_slice(&value.to_be_bytes());
}

/// UCS-2 big-endian encoding of a name
#[allow(dead_code)]
pub fn ucs2_be(name: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(name.len() * 2);
    for c in name.chars() {
        out.extend_from_slice(&(c as u16).to_be_bytes());
    }
    out
}

// --- system-use entry builders -------------------------------------------

#[allow(dead_code)]
pub fn susp_sp(skip: u8) -> Vec<u8> {
    vec![b'S', b'P', 7, 1, 0xBE, 0xEF, skip]
}

#[allow(dead_code)]
pub fn susp_er_rrip() -> Vec<u8> {
    let id = b"RRIP_1991A";
    let descriptor = b"RRIP";
    let source = b"RRIP";
    let mut entry = vec![
        b'E',
        b'R',
        (8 + id.len() + descriptor.len() + source.len()) as u8,
        1,
        id.len() as u8,
        descriptor.len() as u8,
        source.len() as u8,
        1,
    ];
    entry.extend_from_slice(id);
    entry.extend_from_slice(descriptor);
    entry.extend_from_slice(source);
    entry
}

#[allow(dead_code)]
pub fn susp_nm(flags: u8, name: &str) -> Vec<u8> {
    let mut entry = vec![b'N', b'M', (5 + name.len()) as u8, 1, flags];
    entry.extend_from_slice(name.as_bytes());
    entry
}

#[allow(dead_code)]
pub fn susp_px(mode: u32, links: u32, uid: u32, gid: u32) -> Vec<u8> {
    let mut entry = vec![b'P', b'X', 36, 1];
    for value in [mode, links, uid, gid] {
        entry.extend_from_slice(&value.to_le_bytes());
        entry.extend_from_slice(&value.to_be_bytes());
    }
    entry
}

#[allow(dead_code)]
pub fn susp_tf(flags: u8, stamps: &[[u8; 7]]) -> Vec<u8> {
    let mut entry = vec![b'T', b'F', (5 + stamps.len() * 7) as u8, 1, flags];
    for stamp in stamps {
        entry.extend_from_slice(stamp);
    }
    entry
}

#[allow(dead_code)]
pub fn susp_ce(block: u32, offset: u32, length: u32) -> Vec<u8> {
    let mut entry = vec![b'C', b'E', 28, 1];
    for value in [block, offset, length] {
        entry.extend_from_slice(&value.to_le_bytes());
        entry.extend_from_slice(&value.to_be_bytes());
    }
    entry
}
