use indexmap::IndexMap;

/// 客户联系人表 (ClientName -> Email), 运行期间只读
#[derive(Debug, Clone, Default)]
pub struct ContactDirectory {
    contacts: IndexMap<String, String>,
}

impl ContactDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同名客户后出现的行覆盖先出现的行
    pub fn insert(&mut self, client_name: impl Into<String>, email: impl Into<String>) {
        self.contacts.insert(client_name.into(), email.into());
    }

    /// None 表示 "no contact found", 与发送失败区分
    pub fn lookup(&self, client_name: &str) -> Option<&str> {
        self.contacts.get(client_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContactDirectory {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut directory = Self::new();
        for (name, email) in iter {
            directory.insert(name, email);
        }
        directory
    }
}
