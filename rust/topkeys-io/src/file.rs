use std::fs::File;

/// Reads into `buf` starting at `pos` until the buffer is full or the end of
/// the file is reached, returning the number of bytes read.
///
/// A read that returns a count which is not a multiple of `alignment` marks
/// the end of the file: unbuffered handles may reject a follow-up request at
/// the resulting unaligned position, so no further request is issued.
#[cfg(unix)]
pub fn file_read_at(
    file: &File,
    mut pos: u64,
    mut buf: &mut [u8],
    alignment: usize,
) -> std::io::Result<usize> {
    use std::os::unix::fs::FileExt;

    let mut total = 0;
    while !buf.is_empty() {
        match file.read_at(buf, pos) {
            Ok(0) => break,
            Ok(n) => {
                total += n;
                buf = &mut buf[n..];
                pos += n as u64;
                if n % alignment != 0 {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

#[cfg(windows)]
pub fn file_read_at(
    file: &File,
    mut pos: u64,
    mut buf: &mut [u8],
    alignment: usize,
) -> std::io::Result<usize> {
    use std::os::windows::fs::FileExt;

    let mut total = 0;
    while !buf.is_empty() {
        match file.seek_read(buf, pos) {
            Ok(0) => break,
            Ok(n) => {
                total += n;
                buf = &mut buf[n..];
                pos += n as u64;
                if n % alignment != 0 {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::file_read_at;

    #[test]
    fn test_file_read_at_stops_at_eof() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("test.bin");
        std::fs::write(&path, b"abcdefgh").expect("write");
        let file = std::fs::File::open(&path).expect("open");

        let mut buf = [0u8; 16];
        assert_eq!(file_read_at(&file, 0, &mut buf, 1).unwrap(), 8);
        assert_eq!(&buf[..8], b"abcdefgh");

        assert_eq!(file_read_at(&file, 6, &mut buf[..4], 1).unwrap(), 2);
        assert_eq!(&buf[..2], b"gh");

        assert_eq!(file_read_at(&file, 100, &mut buf, 1).unwrap(), 0);
    }
}
