//! IO helper: read raw document bytes for the tree model

use std::{fs::File, io::{BufReader, Read}, path::Path};

use crate::model::data_core::ViewerError;

/// 读取文件原始字节（解码与校验交给模型层）
pub fn read_document(p: &Path) -> Result<Vec<u8>, ViewerError> {
    let f = File::open(p)?;
    let mut rdr = BufReader::new(f);
    let mut bytes = Vec::new();
    rdr.read_to_end(&mut bytes)?;
    tracing::debug!("读取文件 {}: {} 字节", p.display(), bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_document_bytes() {
        let mut file = NamedTempFile::new().expect("创建临时文件失败");
        file.write_all("{\"名称\": 1}".as_bytes()).expect("写入临时文件失败");

        let bytes = read_document(file.path()).unwrap();
        assert_eq!(bytes, "{\"名称\": 1}".as_bytes());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_document(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(ViewerError::Io(_))));
    }
}
