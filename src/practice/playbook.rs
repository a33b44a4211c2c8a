use super::config::{PracticeConfig, Stage};

/// Coaching material for one MOT stage
#[derive(Debug, Clone, Copy)]
pub struct PlaybookEntry {
    pub definition: &'static str,
    pub recommendations: &'static [&'static str],
    pub pitfalls: &'static [&'static str],
}

pub struct Playbook;

impl Playbook {
    pub fn entry(stage: Stage) -> PlaybookEntry {
        match stage {
            Stage::Explore => PlaybookEntry {
                definition: "表达兴趣、表现关注、开放式提问、复述澄清、理解需求。",
                recommendations: &[
                    "“为了能更好地帮到您，我能先请教几个细节吗？”",
                    "“您提到的这一点非常关键，我的理解是...对吗？”",
                    "“除了您刚才说的，还有什么是您比较在意的吗？”",
                    "“听起来您现在最困扰的是...我没理解错吧？”",
                    "“能具体跟我说说当时的情况吗？”",
                ],
                pitfalls: &["急于给方案", "打断客户陈述", "封闭式提问过多"],
            },
            Stage::Propose => PlaybookEntry {
                definition: "互惠、完整、确认利益所在、正向替代方案。",
                recommendations: &[
                    "“基于您的需求，我为您定制了这样一个方案...”",
                    "“如果您选择这个，不仅能解决...还能额外获得...”",
                    "“虽然目前A方案无法实现，但我可以为您申请B方案作为替代。”",
                    "“这个方案对您来说最大的好处是...”",
                    "“您看这个提议能满足您的预期吗？”",
                ],
                pitfalls: &["专业术语过多", "只说功能不说益处", "强行推销"],
            },
            Stage::Act => PlaybookEntry {
                definition: "5C原则：澄清记录、确认、协调、控制、确认。",
                recommendations: &[
                    "“我现在立刻为您去后台核实，请稍等我1分钟。”",
                    "“我已经为您备注好了特殊需求，接下来的流程是...”",
                    "“为了确保万无一失，我再次核对一下核心条款。”",
                    "“这个环节由我来全程跟进，有进度我会第一时间通知您。”",
                    "“好的，手续已经办妥了，这是您的凭证。”",
                ],
                pitfalls: &["承诺含糊不清", "缺乏进度反馈", "流程断档"],
            },
            Stage::Confirm => PlaybookEntry {
                definition: "确认达到/超过客户期望，确认结果与下一步。",
                recommendations: &[
                    "“刚才的处理结果，您还满意吗？”",
                    "“除此之外，还有什么是我今天能为您做的吗？”",
                    "“后续如果您有任何问题，随时可以联系我。”",
                    "“很高兴能帮您解决问题，祝您今天心情愉快。”",
                    "“确认一下，我们刚才约定的下一步动作是...”",
                ],
                pitfalls: &["草率结尾", "忽略情感连接", "未交待下一步"],
            },
            Stage::Full => PlaybookEntry {
                definition: "完整覆盖从探索到确认的全流程服务环节。",
                recommendations: &["（综合以上各阶段句式）"],
                pitfalls: &["（综合以上各阶段坑点）"],
            },
        }
    }
}

/// Persona prompt for the simulated customer, sent at session setup
pub fn system_instruction(config: &PracticeConfig) -> String {
    let entry = Playbook::entry(config.stage);

    format!(
        "你扮演一名在“{industry}”场景下的客户。你的画像是“{persona}”。\n\
         现在正在进行MOT（关键时刻）实战对练。\n\
         当前阶段目标：{stage} - {definition}\n\
         \n\
         你的任务：\n\
         1. 用简体中文对话，高度口语化，像一个真实的客户。\n\
         2. 针对学员（用户）的发言做出自然回应。\n\
         3. 考验学员是否能完成当前MOT阶段的目标。\n\
         4. 每次回复尽量保持在1-2句话，精简有力。\n\
         5. 不要输出任何评分，不要输出JSON。\n\
         6. 如果学员表现得不专业，你可以表达不满或犹豫，制造真实挑战。",
        industry = config.industry,
        persona = config.persona,
        stage = config.stage,
        definition = entry.definition,
    )
}
