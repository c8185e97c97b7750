use crc::{
    Crc,
    Digest,
    CRC_16_MCRF4XX,
};

/// X.25 / MCRF4XX, as used by MAVLink frames.
pub static X25: Crc<u16> = Crc::<u16>::new(&CRC_16_MCRF4XX);

/// Running frame checksum.
pub struct Crc16 {
    digest: Digest<'static, u16>,
}

impl Crc16 {
    #[inline]
    pub fn new() -> Self {
        Self {
            digest: X25.digest(),
        }
    }

    #[inline]
    pub fn update(&mut self, bytes: &[u8]) {
        self.digest.update(bytes);
    }

    #[inline]
    pub fn finish(self) -> u16 {
        self.digest.finalize()
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

/// Checksum of the covered frame bytes (length through payload) followed by the
/// message's seed byte.
pub fn frame_crc(covered: &[u8], crc_extra: u8) -> u16 {
    let mut crc = Crc16::new();
    crc.update(covered);
    crc.update(&[crc_extra]);
    crc.finish()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn check_value() {
        assert_eq!(X25.checksum(b"123456789"), 0x6f91);
    }

    #[test]
    fn incremental_matches_oneshot() {
        let mut crc = Crc16::new();
        crc.update(b"1234");
        crc.update(b"56789");

        assert_eq!(crc.finish(), X25.checksum(b"123456789"));
    }
}
