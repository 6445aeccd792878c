//! Analysis prompt template for a single journal

use serde::Serialize;

use crate::error::{QueryError, QueryResult};
use crate::format::TextReport;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisPrompt {
    pub journal_name: String,
    pub prompt: String,
}

pub fn journal_analysis_prompt(journal_name: &str) -> QueryResult<AnalysisPrompt> {
    let journal_name = journal_name.trim();
    if journal_name.is_empty() {
        return Err(QueryError::InsufficientInput("请提供期刊名称".to_string()));
    }

    let prompt = format!(
        "你是一个专业的学术期刊分析专家。请基于提供的期刊数据，对期刊 {} 进行全面分析，包括：\n\
         \n\
         1. 期刊基本信息分析\n\
         2. 影响因子变化趋势\n\
         3. 分区变化情况\n\
         4. 预警状态评估\n\
         5. 投稿建议\n\
         \n\
         请用专业、客观的语言进行分析，并给出具体的投稿建议。\n",
        journal_name
    );

    Ok(AnalysisPrompt {
        journal_name: journal_name.to_string(),
        prompt,
    })
}

impl TextReport for AnalysisPrompt {
    fn render_text(&self) -> String {
        self.prompt.clone()
    }
}
