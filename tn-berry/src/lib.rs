#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 提供 TN3K 甲状腺结节超声数据集的结构化加载与半监督分割训练所需的基础组件.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 目前主要负责处理 TN3K 数据, 没有对其它源的数据进行直接适配
//!   (但如果新数据按照 TN3K 模式进行组织, 也可以工作).
//! 2. 配置错误 (非法 expID, 未知数据集名) 在构造期立即返回 `Result::Err`,
//!   不会延迟到文件打开时才暴露.
//! 3. 逐样本的 I/O 错误 (清单缺行, 图像解码失败, 掩膜路径不合法)
//!   以显式错误向上传播, 绝不静默跳过.
//!
//! # 开发计划
//!
//! ### 划分解析器 ✅
//!
//! 按 (expID, mode, sign) 组合解析有标注/无标注/验证/测试划分,
//! 读取预生成的清单文本或递归枚举目录树.
//!
//! 实现位于 `tn-berry/src/dataset/split.rs`.
//!
//! ### 成对变换流水线 ✅
//!
//! 按 (mode, sign) 查表选择确定有序的增广流水线; 随机参数每样本采样一次,
//! 对图像与掩膜施加同一几何变换.
//!
//! 实现位于 `tn-berry/src/transform`.
//!
//! ### 样本加载器 ✅
//!
//! 定长可索引集合, 按标注上下文产出带标签/不带标签的样本变体.
//!
//! 实现位于 `tn-berry/src/dataset/tn3k.rs`.
//!
//! ### 数据集工厂 ✅
//!
//! 按运行配置 (manner, dataset, expID) 组装 train/unlabeled/valid
//! 或 test 加载器组合.
//!
//! 实现位于 `tn-berry/src/dataset/build.rs`.
//!
//! ### 损失函数 ✅
//!
//! BCE, Dice, BCE+Dice 以及多项加权余弦一致性损失.
//!
//! 实现位于 `tn-berry/src/loss.rs`.
//!
//! ### MLP 生成器/判别器 ✅
//!
//! 隐向量到图像的前向合成网络及其判别器 (仅前向).
//!
//! 实现位于 `tn-berry/src/gan.rs`.
//!
//! ### 预测图持久化 ✅
//!
//! 将 CHW 张量按 PNG 写入 `./result`.
//!
//! 实现位于 `tn-berry/src/output.rs`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// CHW 格式的三维图像张量.
pub type Tensor3 = ndarray::Array3<f32>;

pub mod consts;

mod error;

pub use error::{ConfigError, DatasetError};

mod config;

pub use config::{Manner, RunConfig};

pub mod dataset;
pub mod gan;
pub mod loss;
pub mod output;
pub mod prelude;
pub mod transform;
