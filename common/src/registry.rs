//! テンプレート台帳
//!
//! テンプレートの一覧と選択中テンプレートを管理する。
//! 一覧は空にならない（最後の1件は削除できない）。

use crate::types::{MaterialItem, Template};

/// テンプレート台帳
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
    current_template_id: String,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::from_templates(default_templates())
    }
}

impl TemplateRegistry {
    /// 既存のテンプレート一覧から生成
    ///
    /// 空の一覧はデフォルトセットに置き換える。先頭を選択状態にする。
    pub fn from_templates(templates: Vec<Template>) -> Self {
        let templates = if templates.is_empty() {
            default_templates()
        } else {
            templates
        };
        let current_template_id = templates[0].id.clone();
        Self {
            templates,
            current_template_id,
        }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn current_template_id(&self) -> &str {
        &self.current_template_id
    }

    /// 選択中テンプレート
    ///
    /// 選択IDが存在しない場合は先頭テンプレートを返す。
    pub fn current_template(&self) -> &Template {
        self.find(&self.current_template_id)
            .unwrap_or(&self.templates[0])
    }

    /// 選択中テンプレートの資材一覧
    pub fn materials(&self) -> &[MaterialItem] {
        &self.current_template().materials
    }

    pub fn find(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// テンプレートを追加して選択する
    pub fn add_template(&mut self, name: &str) -> String {
        let template = Template::new(name);
        let id = template.id.clone();
        self.templates.push(template);
        self.current_template_id = id.clone();
        id
    }

    pub fn rename_template(&mut self, id: &str, new_name: &str) -> bool {
        match self.templates.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.name = new_name.to_string();
                true
            }
            None => false,
        }
    }

    /// テンプレートを削除
    ///
    /// 最後の1件は削除しない。選択中だった場合は先頭に切り替える。
    pub fn remove_template(&mut self, id: &str) -> bool {
        if self.templates.len() <= 1 {
            return false;
        }

        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        if self.templates.len() == before {
            return false;
        }

        if self.current_template_id == id {
            self.current_template_id = self.templates[0].id.clone();
        }
        true
    }

    /// 選択IDを設定（存在チェックはしない）
    pub fn select_template(&mut self, id: &str) {
        self.current_template_id = id.to_string();
    }

    pub fn add_material(&mut self, code: &str, name: &str) -> Option<String> {
        let template = self.current_template_mut()?;
        let material = MaterialItem::new(code, name);
        let id = material.id.clone();
        template.materials.push(material);
        Some(id)
    }

    pub fn update_material(&mut self, material_id: &str, code: &str, name: &str) -> bool {
        let Some(template) = self.current_template_mut() else {
            return false;
        };
        match template.materials.iter_mut().find(|m| m.id == material_id) {
            Some(m) => {
                m.code = code.to_string();
                m.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove_material(&mut self, material_id: &str) -> bool {
        let Some(template) = self.current_template_mut() else {
            return false;
        };
        let before = template.materials.len();
        template.materials.retain(|m| m.id != material_id);
        template.materials.len() != before
    }

    // 資材操作は選択IDに完全一致するテンプレートのみが対象
    fn current_template_mut(&mut self) -> Option<&mut Template> {
        let id = self.current_template_id.clone();
        self.templates.iter_mut().find(|t| t.id == id)
    }
}

fn material(id: &str, code: &str, name: &str) -> MaterialItem {
    MaterialItem {
        id: id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
    }
}

/// 保存データがない場合の初期テンプレート
pub fn default_templates() -> Vec<Template> {
    vec![
        Template {
            id: "1".to_string(),
            name: "Cirurgia Geral (Padrão)".to_string(),
            materials: vec![
                material("1", "SUT-001", "Fio de Sutura Nylon 3-0"),
                material("2", "SUT-002", "Fio de Sutura Vicryl 4-0"),
                material("3", "BIST-15", "Lâmina de Bisturi nº 15"),
                material("4", "GZ-101", "Compressa de Gaze (Pacote)"),
                material("5", "LUV-75", "Luva Cirúrgica 7.5"),
                material("6", "SER-10", "Seringa 10ml"),
            ],
        },
        Template {
            id: "2".to_string(),
            name: "Ortopedia - Pequeno Porte".to_string(),
            materials: vec![
                material("10", "SUT-NYL", "Fio Nylon 2-0 Agulhado"),
                material("11", "FAIXA-SM", "Faixa de Smarch"),
                material("12", "ALGODAO", "Algodão Ortopédico"),
                material("13", "GESSO-15", "Atadura Gessada 15cm"),
            ],
        },
    ]
}
