//! Report rendering. Everything here writes to stdout in the binary; log
//! output never goes through these functions.

use crate::options::OutputMode;
use sim_vmem::{AddressDecoder, Translation, TranslationStats};
use std::io::{self, Write};

/// The per-level mask table.
///
/// ```text
/// Bitmasks
/// level 0 mask C0000000
/// level 1 mask 38000000
/// ```
///
/// # Errors
/// Propagates write failures.
pub fn write_bitmasks(out: &mut impl Write, decoder: &AddressDecoder) -> io::Result<()> {
    writeln!(out, "Bitmasks")?;
    for (level, mask) in decoder.masks().enumerate() {
        writeln!(out, "level {level} mask {mask:08X}")?;
    }
    Ok(())
}

/// One line for a translated address. Writes nothing in the
/// [`OutputMode::Summary`] and [`OutputMode::Bitmasks`] modes.
///
/// # Errors
/// Propagates write failures.
pub fn write_access(
    out: &mut impl Write,
    mode: OutputMode,
    decoder: &AddressDecoder,
    t: &Translation,
) -> io::Result<()> {
    match mode {
        OutputMode::Offset => writeln!(out, "{:08X}", t.offset.as_u32()),
        OutputMode::Vpn2Pfn => {
            for index in decoder.split_indices(t.virtual_address) {
                write!(out, "{index:X} ")?;
            }
            writeln!(out, "-> {}", t.pfn)
        }
        OutputMode::Va2Pa => writeln!(out, "{} -> {}", t.virtual_address, t.physical_address),
        OutputMode::Va2PaTlbPtwalk => {
            let hit_or_miss = |hit: bool| if hit { "hit" } else { "miss" };
            writeln!(
                out,
                "{} -> {}, tlb {}, pagetable {}",
                t.virtual_address,
                t.physical_address,
                hit_or_miss(t.tlb_hit()),
                hit_or_miss(t.page_table_hit()),
            )
        }
        OutputMode::Bitmasks | OutputMode::Summary => Ok(()),
    }
}

/// Aggregate counters after a run.
///
/// # Errors
/// Propagates write failures.
pub fn write_summary(
    out: &mut impl Write,
    page_size: u32,
    stats: &TranslationStats,
) -> io::Result<()> {
    let hits = stats.tlb_hits + stats.page_table_hits;
    let misses = stats.misses();

    writeln!(out, "Page size: {page_size} bytes")?;
    writeln!(out, "Addresses processed: {}", stats.accesses)?;
    writeln!(
        out,
        "Cache hits: {}, Page hits: {}, Total hits: {hits}, Misses: {misses}",
        stats.tlb_hits, stats.page_table_hits
    )?;
    writeln!(
        out,
        "Total hit percentage: {:.2}%, miss percentage: {:.2}%",
        percent(hits, stats.accesses),
        percent(misses, stats.accesses)
    )?;
    writeln!(out, "Frames allocated: {}", stats.frames_allocated)?;
    writeln!(out, "Number of page table entries: {}", stats.page_table_entries)
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_addresses::VirtualAddress;
    use sim_vmem::{AddressSpaceConfig, TranslationEngine};

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).expect("writing to a Vec");
        String::from_utf8(out).expect("utf-8 report")
    }

    fn engine(widths: &[u32], tlb: usize) -> TranslationEngine {
        let cfg = AddressSpaceConfig::new(widths.to_vec()).expect("valid config");
        TranslationEngine::new(&cfg, tlb)
    }

    #[test]
    fn bitmasks_table() {
        let e = engine(&[2, 3, 3], 0);
        let text = render(|out| write_bitmasks(out, e.decoder()));
        assert_eq!(
            text,
            "Bitmasks\nlevel 0 mask C0000000\nlevel 1 mask 38000000\nlevel 2 mask 07000000\n"
        );
    }

    #[test]
    fn per_access_lines() {
        let mut e = engine(&[4, 8], 2);
        let _ = e.translate(VirtualAddress::new(0x1100_0000));
        let t = e.translate(VirtualAddress::new(0x2340_0ABC));
        let dec = e.decoder();

        let line = |mode| render(|out| write_access(out, mode, dec, &t));
        assert_eq!(line(OutputMode::Offset), "00000ABC\n");
        assert_eq!(line(OutputMode::Vpn2Pfn), "2 34 -> 1\n");
        assert_eq!(line(OutputMode::Va2Pa), "23400ABC -> 00100ABC\n");
        assert_eq!(
            line(OutputMode::Va2PaTlbPtwalk),
            "23400ABC -> 00100ABC, tlb miss, pagetable miss\n"
        );
        assert_eq!(line(OutputMode::Summary), "");
    }

    #[test]
    fn tlb_hit_reports_pagetable_miss() {
        let mut e = engine(&[8], 1);
        let _ = e.translate(VirtualAddress::new(0x0100_0000));
        let t = e.translate(VirtualAddress::new(0x0100_0001));
        let text = render(|out| write_access(out, OutputMode::Va2PaTlbPtwalk, e.decoder(), &t));
        assert_eq!(text, "01000001 -> 00000001, tlb hit, pagetable miss\n");
    }

    #[test]
    fn summary_block() {
        let stats = TranslationStats {
            accesses: 4,
            tlb_hits: 1,
            page_table_hits: 1,
            frames_allocated: 2,
            page_table_entries: 3,
        };
        let text = render(|out| write_summary(out, 1 << 28, &stats));
        assert_eq!(
            text,
            "Page size: 268435456 bytes\n\
             Addresses processed: 4\n\
             Cache hits: 1, Page hits: 1, Total hits: 2, Misses: 2\n\
             Total hit percentage: 50.00%, miss percentage: 50.00%\n\
             Frames allocated: 2\n\
             Number of page table entries: 3\n"
        );
    }

    #[test]
    fn empty_run_has_zero_percentages() {
        let text = render(|out| write_summary(out, 4096, &TranslationStats::default()));
        assert!(text.contains("Total hit percentage: 0.00%, miss percentage: 0.00%"));
    }
}
