//! OCRプロンプト生成モジュール
//!
//! CLIとWeb(WASM)で共有される。用紙（Nota de Sala Cirúrgica）は
//! ポルトガル語なので、プロンプトもポルトガル語で記述する。

use crate::types::Template;

/// 手書き追加行のコード接頭辞
pub const MANUAL_CODE_PREFIX: &str = "MANUAL-";

/// OCRプロンプト生成
pub fn build_ocr_prompt() -> String {
    format!(
        r#"Atue como um especialista em OCR de documentos médicos manuscritos.
Analise a imagem da "Nota de Sala Cirúrgica" fornecida.

OBJETIVO: Extrair a tabela de materiais consumidos.

REGRAS DE EXTRAÇÃO:
1. **Itens Impressos**: A maioria dos itens já tem Código e Descrição impressos. O foco principal é ler o NÚMERO MANUSCRITO na coluna de Quantidade/Consumo.
   - Se a quantidade estiver vazia, for um traço (-) ou zero, retorne 0.
   - Se houver um número escrito (ex: 1, 2, 10), retorne esse número.

2. **Itens Manuscritos ("Outros")**:
   - No final da lista, pode haver itens adicionados manualmente à caneta.
   - Leia a Descrição Manuscrita com cuidado. Se a descrição ocupar mais de uma linha visual, concatene o texto em uma única string.
   - Se não houver código para estes itens, gere "{prefix}1", "{prefix}2", etc.
   - Extraia a quantidade correspondente.

3. **Correção de Ruído**:
   - Ignore assinaturas, datas ou carimbos sobrepostos à tabela se possível.
   - Foque estritamente nas linhas que parecem ser materiais e medicamentos.

SAÍDA OBRIGATÓRIA:
Retorne APENAS um JSON válido (Array de Objetos). Nenhuma formatação Markdown.
Exemplo:
[
  {{ "code": "SUT-01", "name": "Fio Nylon", "quantity": 1 }},
  {{ "code": "{prefix}1", "name": "Dreno Suctor 3.2mm", "quantity": 1 }}
]"#,
        prefix = MANUAL_CODE_PREFIX
    )
}

/// テンプレートの印刷済み資材を添えたプロンプト
///
/// 資材が未登録なら `build_ocr_prompt` と同じ。
pub fn build_ocr_prompt_for(template: &Template) -> String {
    let base = build_ocr_prompt();
    if template.materials.is_empty() {
        return base;
    }

    let material_list = template
        .materials
        .iter()
        .map(|m| format!("- {} | {}", m.code, m.name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{base}\n\nMODELO IMPRESSO: \"{name}\"\nItens impressos esperados (Código | Descrição):\n{material_list}",
        name = template.name
    )
}
