//! Probe session: the iteration state machine and result accumulator.

use std::io::{Read, Seek};

use log::{debug, trace, warn};

use crate::error::{ProbeError, Result};
use crate::filter::Filter;
use crate::flags::{FilterMode, RequestFlags, UsageClass};
use crate::reader::DeviceReader;
use crate::registry::{Probe, REGISTRY};
use crate::text::{self, Utf16Encoding};
use crate::value::{Value, ValueStore, VAL_BUF};

/// Outcome of one [`Session::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Match,
    Exhausted,
}

/// One probe operation's state: device binding, buffers, filter, request
/// mask, cursor, collected values.
pub struct Session<F> {
    reader: Option<DeviceReader<F>>,
    filter: Option<Filter>,
    requested: RequestFlags,
    /// Index of the next descriptor to examine. See the cursor-resume design
    /// decision in DESIGN.md: this advances past a match rather than
    /// re-scanning it or restarting at zero.
    cursor: usize,
    values: ValueStore,
}

impl<F> Default for Session<F> {
    fn default() -> Self {
        Session {
            reader: None,
            filter: None,
            requested: RequestFlags::empty(),
            cursor: 0,
            values: ValueStore::new(),
        }
    }
}

impl<F: Read + Seek> Session<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind (or rebind) the device window. Clears buffers and values and
    /// resets the cursor, per the invariant in §3 of the spec.
    pub fn set_device(&mut self, fd: F, base_offset: u64, size: u64) {
        debug!("session: set_device(base_offset={base_offset}, size={size})");
        self.reader = Some(DeviceReader::new(fd, base_offset, size));
        self.cursor = 0;
        self.values.clear();
    }

    pub fn set_request(&mut self, flags: RequestFlags) {
        self.requested = flags;
    }

    pub fn requested(&self) -> RequestFlags {
        self.requested
    }

    pub fn reset_filter(&mut self) {
        match &mut self.filter {
            Some(f) => f.reset(),
            None => self.filter = Some(Filter::by_names(FilterMode::NotIn, &[])),
        }
        self.cursor = 0;
        self.values.clear();
    }

    pub fn filter_types(&mut self, mode: FilterMode, names: &[&str]) {
        self.filter = Some(Filter::by_names(mode, names));
        self.cursor = 0;
        self.values.clear();
    }

    pub fn filter_usage(&mut self, mode: FilterMode, mask: UsageClass) {
        self.filter = Some(Filter::by_usage(mode, mask));
        self.cursor = 0;
        self.values.clear();
    }

    pub fn invert_filter(&mut self) {
        match &mut self.filter {
            Some(f) => f.invert(),
            None => {
                // No filter yet: inverting "nothing skipped" means "everything skipped".
                let mut f = Filter::by_names(FilterMode::NotIn, &[]);
                f.invert();
                self.filter = Some(f);
            }
        }
        self.cursor = 0;
        self.values.clear();
    }

    /// Rewind the cursor and clear collected values without touching the
    /// device binding, filter, or request mask.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.values.clear();
    }

    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    pub fn get_value(&self, i: usize) -> Option<&Value> {
        self.values.get(i)
    }

    pub fn lookup_value(&self, name: &str) -> Option<&Value> {
        self.values.lookup(name)
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.values.has(name)
    }

    /// Drive the registry walk described in the spec's §4.4.
    pub fn step(&mut self) -> Result<StepOutcome> {
        self.values.clear();
        if self.reader.is_none() {
            return Err(ProbeError::NoDevice);
        }

        let mut i = self.cursor;
        while i < REGISTRY.len() {
            if self.filter.as_ref().is_some_and(|f| f.skips(i)) {
                i += 1;
                continue;
            }

            let descriptor = &REGISTRY[i];
            trace!("session: trying descriptor[{i}] = {}", descriptor.name);

            let matched_rule = if descriptor.magics.is_empty() {
                None
            } else {
                match self.find_matching_magic(descriptor.magics)? {
                    Some(rule) => Some(rule),
                    None => {
                        i += 1;
                        continue;
                    }
                }
            };

            if let Some(parser) = descriptor.parser {
                // Borrow-check note: `self` must be reborrowed as `&mut dyn Probe`
                // each call since `matched_rule` borrows from the static registry,
                // not from `self`.
                match parser(self, matched_rule) {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!("session: descriptor[{i}] = {} rejected by parser", descriptor.name);
                        i += 1;
                        continue;
                    }
                    Err(e) => {
                        warn!("session: descriptor[{i}] = {} parser failed: {e}", descriptor.name);
                        i += 1;
                        continue;
                    }
                }
            }

            if self.requested.contains(RequestFlags::TYPE) {
                let _ = self.values.set_value("TYPE", descriptor.name.as_bytes());
            }
            if self.requested.contains(RequestFlags::USAGE) {
                let _ = self.values.set_value("USAGE", descriptor.usage.as_str().as_bytes());
            }

            debug!("session: MATCH descriptor[{i}] = {}", descriptor.name);
            self.cursor = i + 1;
            return Ok(StepOutcome::Match);
        }

        self.cursor = REGISTRY.len();
        Ok(StepOutcome::Exhausted)
    }

    fn find_matching_magic(
        &mut self,
        magics: &'static [crate::registry::MagicRule],
    ) -> Result<Option<&'static crate::registry::MagicRule>> {
        for rule in magics {
            let kb_start = rule.kb_offset as u64 * 1024;
            let within = rule.sector_offset as usize;
            // Fetch the full kibibyte containing the rule, per §4.4.
            let buf = match self.reader_mut().get_buffer(kb_start, 1024) {
                Ok(b) => b,
                Err(_) => continue,
            };
            if within + rule.bytes.len() <= buf.len() && &buf[within..within + rule.bytes.len()] == rule.bytes {
                trace!("session: magic matched at off={}", rule.byte_offset());
                return Ok(Some(rule));
            }
        }
        Ok(None)
    }

    fn reader_mut(&mut self) -> &mut DeviceReader<F> {
        self.reader.as_mut().expect("reader checked present by step()")
    }
}

impl<F: Read + Seek> Probe for Session<F> {
    fn get_buffer(&mut self, off: u64, len: usize) -> Result<&[u8]> {
        self.reader.as_mut().ok_or(ProbeError::NoDevice)?.get_buffer(off, len)
    }

    fn requested(&self) -> RequestFlags {
        self.requested
    }

    fn set_value(&mut self, name: &'static str, bytes: &[u8]) -> Result<()> {
        self.values.set_value(name, bytes)
    }

    fn set_version(&mut self, version: &str) -> Result<()> {
        if !self.requested.contains(RequestFlags::VERSION) {
            return Ok(());
        }
        self.values.set_value("VERSION", version.as_bytes())
    }

    fn set_label(&mut self, raw: &[u8]) -> Result<()> {
        if self.requested.contains(RequestFlags::LABEL_RAW) {
            self.values.set_value("LABEL_RAW", raw)?;
        }
        if !self.requested.contains(RequestFlags::LABEL) {
            return Ok(());
        }
        let n = raw.len().min(VAL_BUF - 1);
        // C strlen semantics: a fixed-width label field stops at its first
        // NUL, not at the field's declared width. Trim trailing ASCII
        // whitespace from what's left, then NUL-terminate.
        let strlen = raw[..n].iter().position(|&b| b == 0).unwrap_or(n);
        let trimmed = text::trim_trailing_whitespace(&raw[..strlen]);
        let len = trimmed.len();
        self.values.assign_raw("LABEL", trimmed, len + 1)
    }

    fn set_utf8label(&mut self, raw: &[u8], encoding: Utf16Encoding) -> Result<()> {
        if self.requested.contains(RequestFlags::LABEL_RAW) {
            self.values.set_value("LABEL_RAW", raw)?;
        }
        if !self.requested.contains(RequestFlags::LABEL) {
            return Ok(());
        }
        let decoded = text::utf16_to_utf8(raw, encoding, VAL_BUF);
        // decoded always carries a terminating NUL (see utf16_to_utf8); trim
        // trailing ASCII whitespace from the cooked bytes ahead of it.
        let cooked = text::trim_trailing_whitespace(&decoded[..decoded.len() - 1]);
        // Divergence from `set_label` preserved deliberately (§4.6 / DESIGN.md):
        // reported length excludes the terminator here.
        let len = cooked.len();
        self.values.assign_raw("LABEL", cooked, len)
    }

    fn set_uuid(&mut self, bytes: [u8; 16]) -> Result<()> {
        if text::is_zero_uuid(&bytes) {
            return Ok(());
        }
        if self.requested.contains(RequestFlags::UUID_RAW) {
            self.values.set_value("UUID_RAW", &bytes)?;
        }
        if !self.requested.contains(RequestFlags::UUID) {
            return Ok(());
        }
        let text = text::format_uuid(&bytes);
        self.values.set_value("UUID", text.as_bytes())
    }

    fn set_uuid_as(&mut self, name: &'static str, bytes: [u8; 16]) -> Result<()> {
        if text::is_zero_uuid(&bytes) {
            return Ok(());
        }
        if !self.requested.contains(RequestFlags::UUID) {
            return Ok(());
        }
        let text = text::format_uuid(&bytes);
        self.values.set_value(name, text.as_bytes())
    }

    fn sprintf_uuid(&mut self, name: &'static str, formatted: &str) -> Result<()> {
        if !self.requested.contains(RequestFlags::UUID) {
            return Ok(());
        }
        // Lowercase the text we're about to write (open question §9.4: fix
        // the off-by-one by operating on this value directly, not one past
        // the end of the value store).
        let mut owned = formatted.to_string();
        text::lowercase_hex(&mut owned);
        self.values.set_value(name, owned.as_bytes())
    }
}
